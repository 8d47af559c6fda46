// src/noyau/erreur.rs
//
// Erreurs du noyau
// ----------------
// Trois genres, toujours retournés comme valeurs (jamais de panique à la frontière) :
// - Syntaxe : grammaire violée (jetons, parenthèses, littéraux, virgules)
// - Math    : domaine violé pendant l’évaluation (division par zéro, log ≤ 0, …)
// - Interne : contrat canon ↔ eval rompu (bug, jamais une condition utilisateur)

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ErreurCalcul {
    #[error("Erreur de syntaxe : {0}")]
    Syntaxe(String),

    #[error("Erreur mathématique : {0}")]
    Math(String),

    #[error("Erreur interne : {0}")]
    Interne(String),
}

impl ErreurCalcul {
    pub fn syntaxe(msg: impl Into<String>) -> Self {
        Self::Syntaxe(msg.into())
    }

    pub fn math(msg: impl Into<String>) -> Self {
        Self::Math(msg.into())
    }

    pub fn interne(msg: impl Into<String>) -> Self {
        Self::Interne(msg.into())
    }

    /// Titre affichable (boîte d’alerte côté UI).
    pub fn titre(&self) -> &'static str {
        match self {
            Self::Syntaxe(_) => "Erreur de syntaxe",
            Self::Math(_) => "Erreur mathématique",
            Self::Interne(_) => "Erreur interne",
        }
    }

    /// Message seul, sans le titre.
    pub fn message(&self) -> &str {
        match self {
            Self::Syntaxe(m) | Self::Math(m) | Self::Interne(m) => m,
        }
    }
}

pub type Resultat<T> = Result<T, ErreurCalcul>;

/// Message commun aux dépassements de borne (factorielle, carré, puissance…).
pub fn trop_grand() -> ErreurCalcul {
    ErreurCalcul::math(format!(
        "La solution est trop grande. (Valeur maximale permise : exp({}))",
        super::nombre::MAX_EXP + 1
    ))
}

pub fn division_par_zero() -> ErreurCalcul {
    ErreurCalcul::math("Division par zéro.")
}
