// src/noyau/format.rs
//
// Affichage des valeurs
// ---------------------
// - fraction exacte : n/d (impropre) ou q/r/d (mixte), signe en tête
// - sinon : décimal “auto” à 15 chiffres significatifs, exponentiel hors [1e-3, 1e10)
// - littéral de réponse (Ans) : relu sans perte par le tokenizer

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::config::StyleFraction;
use super::decimal::{nb_chiffres, Decimal};
use super::nombre::{Nombre, CHIFFRES_ARRONDI};

/// Chiffres significatifs du rendu décimal.
pub const PRECISION_AFFICHAGE: usize = 15;

const EXP_BAS: i64 = -3;
const EXP_HAUT: i64 = 10;

pub fn format_nombre(valeur: &Nombre, style: StyleFraction) -> String {
    match valeur {
        Nombre::Exact(q) if !q.denom().is_one() => {
            let n = q.numer().abs();
            let d = q.denom();
            // n + d trop longs : décimal
            if nb_chiffres(&n) + nb_chiffres(d) <= CHIFFRES_ARRONDI {
                format_fraction(q.is_negative(), &n, d, style)
            } else {
                format_decimal(&Decimal::depuis_rationnel(q))
            }
        }
        _ => format_decimal(&valeur.vers_decimal()),
    }
}

fn format_fraction(negatif: bool, n: &BigInt, d: &BigInt, style: StyleFraction) -> String {
    let signe = if negatif { "-" } else { "" };
    match style {
        StyleFraction::Impropre => format!("{signe}{n}/{d}"),
        StyleFraction::Mixte => {
            let q = n / d;
            let r = n % d;
            if q.is_zero() {
                format!("{signe}{r}/{d}")
            } else {
                format!("{signe}{q}/{r}/{d}")
            }
        }
    }
}

/// Notation “auto” : 1234.5, 0.00125, 1.5e+12, 2e-5.
pub fn format_decimal(d: &Decimal) -> String {
    if d.est_zero() {
        return "0".to_string();
    }

    let r = d.arrondi_significatif(PRECISION_AFFICHAGE);
    let e = r.exposant10();
    let chiffres = r.mantisse().abs().to_string();
    let signe = if r.est_negatif() { "-" } else { "" };

    if !(EXP_BAS..EXP_HAUT).contains(&e) {
        let (tete, queue) = chiffres.split_at(1);
        let mantisse = if queue.is_empty() {
            tete.to_string()
        } else {
            format!("{tete}.{queue}")
        };
        let signe_e = if e < 0 { '-' } else { '+' };
        return format!("{signe}{mantisse}e{signe_e}{}", e.abs());
    }

    if r.exposant() >= 0 {
        return format!("{signe}{chiffres}{}", "0".repeat(r.exposant() as usize));
    }

    let decimales = (-r.exposant()) as usize;
    if chiffres.len() > decimales {
        let (ent, frac) = chiffres.split_at(chiffres.len() - decimales);
        format!("{signe}{ent}.{frac}")
    } else {
        let zeros = "0".repeat(decimales - chiffres.len());
        format!("{signe}0.{zeros}{chiffres}")
    }
}

/// Littéral relu sans perte par `tokenize` : `-7/2`, `5`, `-1234567E-52`.
pub fn format_litteral(valeur: &Nombre) -> String {
    match valeur {
        Nombre::Exact(q) => format_rationnel(q),
        Nombre::Approx(d) => d.to_string(),
    }
}

fn format_rationnel(q: &BigRational) -> String {
    if q.denom().is_one() {
        format!("{}", q.numer())
    } else {
        format!("{}/{}", q.numer(), q.denom())
    }
}
