// src/noyau/config.rs
//
// Configuration d’un appel au noyau
// ---------------------------------
// - Reglages : unité d’angle + style de fraction (sérialisables, persistés par l’appelant)
// - TableConstantes : constantes nommées de l’appelant (nom → valeur décimale)
// - Config : réglages + réponse précédente (Ans) + constantes

use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use super::decimal::Decimal;
use super::erreur::{ErreurCalcul, Resultat};
use super::jetons::SEPARATEURS;
use super::nombre::Nombre;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UniteAngle {
    #[default]
    Degre,
    Radian,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleFraction {
    /// 7/2
    #[default]
    Impropre,
    /// 3/1/2
    Mixte,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reglages {
    pub unite_angle: UniteAngle,
    pub style_fraction: StyleFraction,
}

/// Entrée persistée d’une constante (valeur au format affiché).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstanteUtilisateur {
    pub nom: String,
    pub valeur: String,
}

pub const NOM_CONSTANTE_MAX: usize = 10;

// mots qu’un nom de constante masquerait
const NOMS_RESERVES: &[&str] = &["E", "x"];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableConstantes {
    valeurs: BTreeMap<String, Decimal>,
}

impl TableConstantes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depuis(entrees: impl IntoIterator<Item = ConstanteUtilisateur>) -> Resultat<Self> {
        let mut table = Self::new();
        for c in entrees {
            table.definir(&c.nom, &c.valeur)?;
        }
        Ok(table)
    }

    /// Ajoute (ou remplace) une constante après validation du nom et de la valeur.
    pub fn definir(&mut self, nom: &str, valeur: &str) -> Resultat<()> {
        valider_nom(nom)?;
        let v = lire_valeur(valeur)?;
        self.valeurs.insert(nom.to_string(), v);
        Ok(())
    }

    pub fn retirer(&mut self, nom: &str) -> bool {
        self.valeurs.remove(nom).is_some()
    }

    pub fn valeur(&self, nom: &str) -> Option<&Decimal> {
        self.valeurs.get(nom)
    }

    pub fn noms(&self) -> impl Iterator<Item = &str> {
        self.valeurs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.valeurs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valeurs.is_empty()
    }
}

fn valider_nom(nom: &str) -> Resultat<()> {
    if nom.is_empty() || nom.len() > NOM_CONSTANTE_MAX {
        return Err(ErreurCalcul::syntaxe(format!(
            "Le nom d’une constante doit compter de 1 à {NOM_CONSTANTE_MAX} lettres."
        )));
    }
    if !nom.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(ErreurCalcul::syntaxe(format!(
            "Le nom « {nom} » ne doit contenir que des lettres (a-z, A-Z)."
        )));
    }
    if SEPARATEURS.contains(&nom) || NOMS_RESERVES.contains(&nom) {
        return Err(ErreurCalcul::syntaxe(format!(
            "Le nom « {nom} » est réservé."
        )));
    }
    // une formule ne peut pas finir par E (exposant incomplet)
    if nom.ends_with('E') {
        return Err(ErreurCalcul::syntaxe(format!(
            "Le nom « {nom} » ne peut pas se terminer par E."
        )));
    }
    Ok(())
}

/// Valeur au format affiché : décimal (`-1.5e+12`), fraction `n/d` ou mixte `q/r/d`.
fn lire_valeur(texte: &str) -> Resultat<Decimal> {
    let t = texte.trim();
    if !t.contains('/') {
        return t.parse();
    }

    let invalide = || ErreurCalcul::syntaxe(format!("Valeur de constante invalide : « {t} »."));

    let (neg, corps) = match t.strip_prefix('-') {
        Some(reste) => (true, reste),
        None => (false, t),
    };

    let parties = corps
        .split('/')
        .map(|p| {
            if p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()) {
                None
            } else {
                BigInt::parse_bytes(p.as_bytes(), 10)
            }
        })
        .collect::<Option<Vec<BigInt>>>()
        .ok_or_else(invalide)?;

    let (entier, n, d) = match parties.as_slice() {
        [n, d] => (BigInt::zero(), n.clone(), d.clone()),
        [q, n, d] => (q.clone(), n.clone(), d.clone()),
        _ => return Err(invalide()),
    };
    if d.is_zero() {
        return Err(invalide());
    }

    let v = BigRational::from_integer(entier) + BigRational::new(n, d);
    let v = Decimal::depuis_rationnel(&v);
    Ok(if neg { -v } else { v })
}

/// Tout ce qu’un appel au noyau consomme, en lecture seule.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub reglages: Reglages,
    /// Réponse précédente (Ans), exact 0 par défaut.
    pub reponse: Nombre,
    pub constantes: TableConstantes,
}

impl Config {
    pub fn avec_reglages(reglages: Reglages) -> Self {
        Self {
            reglages,
            ..Self::default()
        }
    }

    pub fn radians() -> Self {
        Self::avec_reglages(Reglages {
            unite_angle: UniteAngle::Radian,
            ..Reglages::default()
        })
    }
}
