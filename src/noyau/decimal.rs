// src/noyau/decimal.rs
//
// Décimal en précision arbitraire (mode “non exact” du noyau)
// ------------------------------------------------------------
// valeur = mantisse × 10^exposant
//
// Forme canonique :
// - au plus PRECISION chiffres significatifs (arrondi demi loin de zéro)
// - zéros de queue retirés (donc égalité structurelle = égalité de valeur)
// - zéro = 0 × 10^0
//
// Même technique que la lecture décimale d’origine : tout passe par des BigInt
// “scalés”, jamais de flottants (sauf estimation grossière, cf. vers_f64).

use std::cmp::Ordering;
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::erreur::ErreurCalcul;

/// Chiffres significatifs conservés après chaque opération.
pub const PRECISION: usize = 48;

/// Sous ce plancher, la valeur s’écrase sur zéro ; au-dessus du plafond, l’exposant
/// sature (toute valeur y est déjà « trop grande »). La somme de deux exposants
/// bornés ne déborde jamais d’un i64.
pub const EXPOSANT_PLANCHER: i64 = -(1 << 52);
pub const EXPOSANT_PLAFOND: i64 = 1 << 52;

/* ------------------------ Outils BigInt ------------------------ */

pub fn pow10(n: usize) -> BigInt {
    BigInt::from(10).pow(n as u32)
}

/// Nombre de chiffres décimaux de |n| (0 compte pour 1).
pub fn nb_chiffres(n: &BigInt) -> usize {
    if n.is_zero() {
        1
    } else {
        n.magnitude().to_str_radix(10).len()
    }
}

/// n / d arrondi au plus proche (demi loin de zéro). d > 0.
pub fn div_arrondie(n: &BigInt, d: &BigInt) -> BigInt {
    let q: BigInt = (n * 2) / d;
    if q.is_negative() {
        (q - 1) / 2
    } else {
        (q + 1) / 2
    }
}

/* ------------------------ Décimal ------------------------ */

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Decimal {
    mantisse: BigInt,
    exposant: i64,
}

impl Decimal {
    pub fn zero() -> Self {
        Self {
            mantisse: BigInt::zero(),
            exposant: 0,
        }
    }

    pub fn un() -> Self {
        Self {
            mantisse: BigInt::one(),
            exposant: 0,
        }
    }

    /// mantisse × 10^exposant, ramené à PRECISION chiffres.
    pub fn new(mantisse: BigInt, exposant: i64) -> Self {
        Self::arrondi(mantisse, exposant, PRECISION)
    }

    /// mantisse × 10^exposant, ramené à `chiffres` chiffres significatifs.
    pub fn arrondi(mantisse: BigInt, exposant: i64, chiffres: usize) -> Self {
        if mantisse.is_zero() {
            return Self::zero();
        }

        let n = nb_chiffres(&mantisse);
        let (mut m, mut e) = if n > chiffres {
            let k = n - chiffres;
            (div_arrondie(&mantisse, &pow10(k)), exposant.saturating_add(k as i64))
        } else {
            (mantisse, exposant)
        };

        let dix = BigInt::from(10);
        while !m.is_zero() && (&m % &dix).is_zero() {
            m /= &dix;
            e = e.saturating_add(1);
        }

        if m.is_zero() || e < EXPOSANT_PLANCHER {
            return Self::zero();
        }

        Self {
            mantisse: m,
            exposant: e.min(EXPOSANT_PLAFOND),
        }
    }

    pub fn entier(n: impl Into<BigInt>) -> Self {
        Self::new(n.into(), 0)
    }

    /// Point fixe : s / 10^w.
    pub fn depuis_fixe(s: BigInt, w: usize) -> Self {
        Self::new(s, -(w as i64))
    }

    pub fn depuis_rationnel(r: &BigRational) -> Self {
        Self::quotient(r.numer(), r.denom(), 0)
    }

    /// (n / d) × 10^e, d ≠ 0.
    fn quotient(n: &BigInt, d: &BigInt, e: i64) -> Self {
        if n.is_zero() {
            return Self::zero();
        }
        let k = (PRECISION + 3 + nb_chiffres(d)).saturating_sub(nb_chiffres(n));
        let q = (n * pow10(k)) / d;
        Self::new(q, e.saturating_sub(k as i64))
    }

    /* ------------------------ Accès ------------------------ */

    pub fn mantisse(&self) -> &BigInt {
        &self.mantisse
    }

    pub fn exposant(&self) -> i64 {
        self.exposant
    }

    pub fn est_zero(&self) -> bool {
        self.mantisse.is_zero()
    }

    pub fn est_negatif(&self) -> bool {
        self.mantisse.is_negative()
    }

    pub fn signum(&self) -> i32 {
        if self.mantisse.is_zero() {
            0
        } else if self.mantisse.is_negative() {
            -1
        } else {
            1
        }
    }

    /// Forme canonique : entier ⇔ exposant ≥ 0.
    pub fn est_entier(&self) -> bool {
        self.exposant >= 0
    }

    /// floor(log10 |x|). Indéfini pour 0 (retourne 0).
    pub fn exposant10(&self) -> i64 {
        if self.est_zero() {
            return 0;
        }
        self.exposant + nb_chiffres(&self.mantisse) as i64 - 1
    }

    pub fn abs(&self) -> Self {
        Self {
            mantisse: self.mantisse.abs(),
            exposant: self.exposant,
        }
    }

    pub fn arrondi_significatif(&self, chiffres: usize) -> Self {
        Self::arrondi(self.mantisse.clone(), self.exposant, chiffres)
    }

    /* ------------------------ Arithmétique ------------------------ */

    pub fn ajouter(&self, autre: &Self) -> Self {
        if self.est_zero() {
            return autre.clone();
        }
        if autre.est_zero() {
            return self.clone();
        }

        // ordres de grandeur trop éloignés : le plus petit disparaît à l’arrondi
        let ecart = self.exposant10() - autre.exposant10();
        let garde = (PRECISION + 2) as i64;
        if ecart > garde {
            return self.clone();
        }
        if -ecart > garde {
            return autre.clone();
        }

        let e = self.exposant.min(autre.exposant);
        let a = &self.mantisse * pow10((self.exposant - e) as usize);
        let b = &autre.mantisse * pow10((autre.exposant - e) as usize);
        Self::new(a + b, e)
    }

    pub fn soustraire(&self, autre: &Self) -> Self {
        self.ajouter(&-autre.clone())
    }

    pub fn multiplier(&self, autre: &Self) -> Self {
        Self::new(
            &self.mantisse * &autre.mantisse,
            self.exposant.saturating_add(autre.exposant),
        )
    }

    /// None si division par zéro.
    pub fn diviser(&self, autre: &Self) -> Option<Self> {
        if autre.est_zero() {
            return None;
        }
        Some(Self::quotient(
            &self.mantisse,
            &autre.mantisse,
            self.exposant.saturating_sub(autre.exposant),
        ))
    }

    pub fn inverse(&self) -> Option<Self> {
        Self::un().diviser(self)
    }

    /* ------------------------ Conversions ------------------------ */

    /// Entier scalé : floor-vers-zéro(x × 10^w).
    pub fn vers_fixe(&self, w: usize) -> BigInt {
        let e = self.exposant + w as i64;
        if e >= 0 {
            &self.mantisse * pow10(e as usize)
        } else {
            let k = (-e) as usize;
            if k > nb_chiffres(&self.mantisse) + 1 {
                BigInt::zero()
            } else {
                &self.mantisse / pow10(k)
            }
        }
    }

    /// Rationnel exact équivalent, seulement pour des exposants raisonnables.
    pub fn vers_rationnel(&self) -> Option<BigRational> {
        if self.exposant.unsigned_abs() > 400 {
            return None;
        }
        let r = if self.exposant >= 0 {
            BigRational::from_integer(&self.mantisse * pow10(self.exposant as usize))
        } else {
            BigRational::new(
                self.mantisse.clone(),
                pow10((-self.exposant) as usize),
            )
        };
        Some(r)
    }

    /// Entier exact si la valeur est entière (exposant borné).
    pub fn vers_bigint(&self) -> Option<BigInt> {
        if !self.est_entier() || self.exposant > 1000 {
            return None;
        }
        Some(&self.mantisse * pow10(self.exposant as usize))
    }

    /// Estimation flottante (amorces de Newton, tests) — jamais pour un résultat.
    pub fn vers_f64(&self) -> f64 {
        format!("{}e{}", self.mantisse, self.exposant)
            .parse()
            .unwrap_or(f64::NAN)
    }
}

/// Découpe un littéral clavier (`12.5`, `.5`, `3E-4`, `E5`) en (mantisse, exposant),
/// sans arrondi. None si le littéral est mal formé.
pub fn decomposer_litteral(txt: &str) -> Option<(BigInt, i64)> {
    let (base, exp) = match txt.split_once('E') {
        Some((b, e)) => (b, Some(e)),
        None => (txt, None),
    };

    let exp10: i64 = match exp {
        None => 0,
        Some(e) => {
            let chiffres = e.strip_prefix('-').unwrap_or(e);
            if chiffres.is_empty() || !chiffres.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            // exposant hors i64 : saturé (zéro ou « trop grand » plus loin)
            e.parse().unwrap_or(if e.starts_with('-') { i64::MIN } else { i64::MAX })
        }
    };

    // E5 : base omise => 1
    if base.is_empty() {
        return exp.map(|_| (BigInt::one(), exp10));
    }

    let (ent, frac) = base.split_once('.').unwrap_or((base, ""));
    let tous_chiffres = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (ent.is_empty() && frac.is_empty()) || !tous_chiffres(ent) || !tous_chiffres(frac) {
        return None;
    }

    let chiffres = format!("{ent}{frac}");
    let m = BigInt::parse_bytes(chiffres.as_bytes(), 10)?;
    Some((m, exp10.saturating_sub(frac.len() as i64)))
}

impl Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal {
            mantisse: -self.mantisse,
            exposant: self.exposant,
        }
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.soustraire(other).signum().cmp(&0)
    }
}

/// Texte décimal usuel : `-12.5`, `0.25`, `1.5e+12`, `3E-4`.
impl FromStr for Decimal {
    type Err = ErreurCalcul;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalide = || ErreurCalcul::syntaxe(format!("Valeur numérique invalide : « {s} »."));

        let t = s.trim();
        let (neg, corps) = match t.strip_prefix('-') {
            Some(reste) => (true, reste),
            None => (false, t.strip_prefix('+').unwrap_or(t)),
        };

        let (base, exp) = match corps.find(['e', 'E']) {
            Some(p) => (&corps[..p], Some(&corps[p + 1..])),
            None => (corps, None),
        };
        let exp = exp.map(|e| e.strip_prefix('+').unwrap_or(e));

        let litteral = match exp {
            Some(e) => format!("{base}E{e}"),
            None => base.to_string(),
        };
        if base.is_empty() {
            return Err(invalide());
        }

        let (m, e) = decomposer_litteral(&litteral).ok_or_else(invalide)?;
        let d = Decimal::new(m, e);
        Ok(if neg { -d } else { d })
    }
}

/// Forme brute `mantisseEexposant` (lisible par le tokenizer).
impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exposant == 0 {
            write!(f, "{}", self.mantisse)
        } else {
            write!(f, "{}E{}", self.mantisse, self.exposant)
        }
    }
}
