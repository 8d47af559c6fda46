// src/noyau/trig.rs
//
// Trig spéciale (angles “exactement reconnus”) en degrés
// -----------------------------------------------------
// - Angle exact multiple de 15° : k = angle/15 réduit modulo 24 (un tour)
// - Table des valeurs rationnelles (0, ±1/2, ±1) et des points indéfinis
// - Les valeurs en √2, √3 ne sont pas rationnelles : None (calcul décimal)

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};

use super::jetons::Fonction;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrigFn {
    Sin,
    Cos,
    Tan,
    Sec,
    Csc,
    Cot,
}

impl TrigFn {
    pub fn depuis(f: Fonction) -> Option<Self> {
        match f {
            Fonction::Sin => Some(Self::Sin),
            Fonction::Cos => Some(Self::Cos),
            Fonction::Tan => Some(Self::Tan),
            Fonction::Sec => Some(Self::Sec),
            Fonction::Csc => Some(Self::Csc),
            Fonction::Cot => Some(Self::Cot),
            _ => None,
        }
    }

    pub fn nom(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Sec => "sec",
            Self::Csc => "csc",
            Self::Cot => "cot",
        }
    }

    /// tan et sec divisent par cos ; csc et cot par sin.
    pub fn divise_par_cos(self) -> bool {
        matches!(self, Self::Tan | Self::Sec)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TrigOutcome {
    Valeur(BigRational, String),
    Indefini(String),
}

/// Reconnaît les angles remarquables (en degrés) donnant une valeur rationnelle.
///
/// Retour:
/// - Some(Valeur(q, preuve)) si reconnu
/// - Some(Indefini(preuve)) si indéfini (tan(90°), csc(180°), …)
/// - None si non reconnu
pub fn trig_special_degres(angle: &BigRational, f: TrigFn) -> Option<TrigOutcome> {
    // 1) multiple de 15° ?
    let quinze = BigRational::from_integer(BigInt::from(15));
    let q = angle / quinze;
    if !q.is_integer() {
        return None;
    }

    // 2) réduction modulo 360° (24 × 15°)
    let k = (q.numer() % BigInt::from(24)).to_i64()?.rem_euclid(24);

    let angle_txt = format_angle_degres(angle);
    let nom = f.nom();
    let valeur = |r: BigRational| {
        let txt = format_rationnel(&r);
        TrigOutcome::Valeur(r, format!("{nom}({angle_txt}) = {txt}"))
    };
    let indefini = || TrigOutcome::Indefini(format!("{nom}({angle_txt}) = indéfini"));

    let out = match f {
        TrigFn::Sin => valeur(sin_rationnel(k)?),
        TrigFn::Cos => valeur(sin_rationnel(k + 6)?),

        TrigFn::Tan => match k {
            0 | 12 => valeur(rat(0, 1)),
            3 | 15 => valeur(rat(1, 1)),
            9 | 21 => valeur(rat(-1, 1)),
            6 | 18 => indefini(),
            _ => return None,
        },

        TrigFn::Cot => match k {
            6 | 18 => valeur(rat(0, 1)),
            3 | 15 => valeur(rat(1, 1)),
            9 | 21 => valeur(rat(-1, 1)),
            0 | 12 => indefini(),
            _ => return None,
        },

        TrigFn::Sec => {
            let c = sin_rationnel(k + 6)?;
            if c.is_zero() {
                indefini()
            } else {
                valeur(c.recip())
            }
        }

        TrigFn::Csc => {
            let s = sin_rationnel(k)?;
            if s.is_zero() {
                indefini()
            } else {
                valeur(s.recip())
            }
        }
    };

    Some(out)
}

/* ------------------------ Outils ------------------------ */

fn rat(n: i64, d: i64) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(d))
}

/// sin(k·15°) quand il est rationnel.
fn sin_rationnel(k: i64) -> Option<BigRational> {
    match k.rem_euclid(24) {
        0 | 12 => Some(rat(0, 1)),
        2 | 10 => Some(rat(1, 2)),
        6 => Some(rat(1, 1)),
        14 | 22 => Some(rat(-1, 2)),
        18 => Some(rat(-1, 1)),
        _ => None,
    }
}

fn format_angle_degres(angle: &BigRational) -> String {
    format!("{}°", angle.numer())
}

fn format_rationnel(r: &BigRational) -> String {
    if r.is_integer() {
        format!("{}", r.numer())
    } else {
        format!("{}/{}", r.numer(), r.denom())
    }
}
