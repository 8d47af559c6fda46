// src/noyau/nombre.rs
//
// Valeur numérique du noyau
// -------------------------
// - Exact(BigRational) : numérateur et dénominateur bornés par MAX_FRACT_PART
// - Approx(Decimal)    : tout le reste (irrationnel, hors borne, constantes)
//
// Le test de rationalité décide, après chaque fonction, si un résultat décimal
// “retombe” proprement sur une fraction (ex. √(9/4) = 1.5 = 3/2).

use std::ops::Neg;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::decimal::{pow10, Decimal};

/// Borne des numérateurs / dénominateurs exacts (2^31 − 1).
pub const MAX_FRACT_PART: i64 = 2_147_483_647;
/// Plus grand exposant décimal permis pour un résultat.
pub const MAX_EXP: i64 = 9_999_999;
/// Plus grand argument de `!` (au-delà : dépassement de MAX_EXP).
pub const MAX_FACTORIAL_ARG: u64 = 1_723_507;
/// Chiffres significatifs retenus par le test de rationalité.
pub const CHIFFRES_ARRONDI: usize = 16;

// au-delà : la valeur “a l’air” irrationnelle
const MAX_DECIMALES: i64 = 8;
// sous 10^-3 le rendu passe en notation scientifique
const EXP_SCIENTIFIQUE_BAS: i64 = -3;

#[derive(Clone, Debug, PartialEq)]
pub enum Nombre {
    Exact(BigRational),
    Approx(Decimal),
}

impl Default for Nombre {
    fn default() -> Self {
        Nombre::zero()
    }
}

impl Nombre {
    pub fn zero() -> Self {
        Nombre::Exact(BigRational::zero())
    }

    pub fn entier(n: i64) -> Self {
        Nombre::Exact(BigRational::from_integer(BigInt::from(n)))
    }

    pub fn fraction(n: i64, d: i64) -> Self {
        Nombre::Exact(BigRational::new(BigInt::from(n), BigInt::from(d)))
    }

    pub fn est_exact(&self) -> bool {
        matches!(self, Nombre::Exact(_))
    }

    pub fn signum(&self) -> i32 {
        match self {
            Nombre::Exact(q) => {
                if q.is_zero() {
                    0
                } else if q.is_negative() {
                    -1
                } else {
                    1
                }
            }
            Nombre::Approx(d) => d.signum(),
        }
    }

    pub fn est_zero(&self) -> bool {
        self.signum() == 0
    }

    pub fn est_negatif(&self) -> bool {
        self.signum() < 0
    }

    pub fn est_un(&self) -> bool {
        match self {
            Nombre::Exact(q) => q.is_one(),
            Nombre::Approx(d) => *d == Decimal::un(),
        }
    }

    pub fn vers_decimal(&self) -> Decimal {
        match self {
            Nombre::Exact(q) => Decimal::depuis_rationnel(q),
            Nombre::Approx(d) => d.clone(),
        }
    }

    /// Valeur entière : dénominateur 1 (exact) ou entière à 16 chiffres (décimal).
    pub fn entier_de(&self) -> Option<BigInt> {
        match self {
            Nombre::Exact(q) if q.is_integer() => Some(q.numer().clone()),
            Nombre::Exact(_) => None,
            Nombre::Approx(d) => entier_affiche(d),
        }
    }

    /// Estimation flottante (tests et traces uniquement).
    pub fn vers_f64(&self) -> f64 {
        match self {
            Nombre::Exact(q) => q.to_f64().unwrap_or(f64::NAN),
            Nombre::Approx(d) => d.vers_f64(),
        }
    }
}

impl Neg for Nombre {
    type Output = Nombre;

    fn neg(self) -> Nombre {
        match self {
            Nombre::Exact(q) => Nombre::Exact(-q),
            Nombre::Approx(d) => Nombre::Approx(-d),
        }
    }
}

/* ------------------------ Bornes ------------------------ */

pub fn dans_bornes(q: &BigRational) -> bool {
    let borne = BigInt::from(MAX_FRACT_PART);
    q.numer().abs() <= borne && q.denom().abs() <= borne
}

/// |d| ≥ 10^(MAX_EXP + 1) ?
pub fn depasse_maximum(d: &Decimal) -> bool {
    !d.est_zero() && d.exposant10() > MAX_EXP
}

/// Rationnel exact d’un littéral clavier (mantisse × 10^exposant), si borné.
pub fn rationnel_litteral(mantisse: &BigInt, exposant: i64) -> Option<BigRational> {
    if mantisse.is_zero() {
        return Some(BigRational::zero());
    }
    // 2^31 a 10 chiffres : au-delà, aucune chance de tenir dans la borne
    if exposant.unsigned_abs() > 40 {
        return None;
    }
    let q = if exposant >= 0 {
        BigRational::from_integer(mantisse * pow10(exposant as usize))
    } else {
        BigRational::new(mantisse.clone(), pow10((-exposant) as usize))
    };
    dans_bornes(&q).then_some(q)
}

/* ------------------------ Test de rationalité ------------------------ */

/// Entier “à l’affichage” : la valeur arrondie à 16 chiffres est entière.
pub fn entier_affiche(d: &Decimal) -> Option<BigInt> {
    d.arrondi_significatif(CHIFFRES_ARRONDI).vers_bigint()
}

/// Décimal → rationnel exact s’il “retombe” proprement, sinon None.
///
/// 1. arrondi à 16 chiffres significatifs
/// 2. entier : exact s’il tient dans la borne
/// 3. sous 10^-3 : décimal
/// 4. plus de 8 décimales : décimal
/// 5. p/10^k réduit, accepté si borné et si l’aller-retour redonne la même valeur
pub fn test_rationalite(v: &Decimal) -> Option<BigRational> {
    let r = v.arrondi_significatif(CHIFFRES_ARRONDI);
    if r.est_zero() {
        return Some(BigRational::zero());
    }

    // 10 chiffres ou plus dans la partie entière : hors borne de toute façon
    if r.exposant10() > 9 {
        return None;
    }

    if r.est_entier() {
        let q = r.vers_rationnel()?;
        return dans_bornes(&q).then_some(q);
    }

    if r.exposant10() < EXP_SCIENTIFIQUE_BAS {
        return None;
    }

    if -r.exposant() > MAX_DECIMALES {
        return None;
    }

    let q = r.vers_rationnel()?;
    if !dans_bornes(&q) {
        return None;
    }

    let retour = Decimal::depuis_rationnel(&q).arrondi_significatif(CHIFFRES_ARRONDI);
    (retour == r).then_some(q)
}
