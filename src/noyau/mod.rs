//! Noyau de calcul clavier
//!
//! Organisation interne :
//! - jetons.rs      : tokenisation (plus long séparateur d’abord) + contrôles bruts
//! - canon.rs       : forme canonique (× implicites, fermetures, Ans, E)
//! - paires.rs      : index des parenthèses + découpe sur virgules
//! - eval.rs        : machine à piles, drapeau d’exactitude, démarche
//! - fonctions.rs   : √, x√, ^, E, log, ln, trigo, !, ²
//! - trig.rs        : angles remarquables en degrés (valeurs exactes)
//! - nombre.rs      : valeur exacte (rationnel borné) ou décimale
//! - decimal.rs     : décimal multiprécision (48 chiffres)
//! - transcendant.rs: π, e, ln, exp, trigo en virgule fixe + cache
//! - format.rs      : affichage (fraction, notation auto) + littéral Ans
//! - config.rs      : réglages sérialisables + constantes utilisateur
//! - erreur.rs      : Syntaxe / Math / Interne

pub mod canon;
pub mod config;
pub mod decimal;
pub mod erreur;
pub mod eval;
mod fonctions;
pub mod format;
pub mod jetons;
pub mod nombre;
pub mod paires;
pub mod transcendant;
pub mod trig;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique
pub use canon::Canoniseur;
pub use config::{Config, ConstanteUtilisateur, Reglages, StyleFraction, TableConstantes, UniteAngle};
pub use decimal::Decimal;
pub use erreur::{ErreurCalcul, Resultat};
pub use eval::{eval_expression, evaluate_formula, DemarcheNoyau, Evaluation};
pub use format::{format_litteral, format_nombre};
pub use jetons::{tokenize, Tok};
pub use nombre::Nombre;
