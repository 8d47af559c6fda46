// src/noyau/transcendant.rs
//
// Fonctions réelles en précision arbitraire
// -----------------------------------------
// Tout est calculé en entiers “scalés” (×10^w) puis ramené en Decimal :
// - constantes π, ln 2, ln 10 (séries d’arctan / argth + cache par nombre de chiffres)
// - exp, ln, sin, cos, atan, asin, acos
// - racines (carrée, n-ième) et factorielle
//
// Les domaines sont vérifiés par l’appelant (noyau::fonctions).

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use num_bigint::BigInt;
use num_traits::{One, ToPrimitive, Zero};

use super::decimal::{div_arrondie, nb_chiffres, pow10, Decimal, PRECISION};
use super::nombre::MAX_EXP;

/// Chiffres de garde au-dessus de la précision des Decimal.
const GARDE: usize = 16;

fn chiffres_travail() -> usize {
    PRECISION + GARDE
}

/* ------------------------ Constantes + cache ------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Cle {
    Pi,
    Ln2,
    Ln10,
}

/// Une entrée par constante : (chiffres, valeur scalée) à la plus grande précision calculée.
static CONSTANTES: OnceLock<Mutex<HashMap<Cle, (usize, BigInt)>>> = OnceLock::new();

/// Constante scalée ×10^chiffres (troncature). Une précision plus basse se déduit
/// de l’entrée en cache par troncature décimale.
fn constante(cle: Cle, chiffres: usize) -> BigInt {
    let m = CONSTANTES.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = m.lock().unwrap_or_else(|e| e.into_inner());

    let connue = match guard.get(&cle) {
        Some((p, v)) if *p >= chiffres => return v / pow10(p - chiffres),
        Some((p, _)) => *p,
        None => 0,
    };

    // précision cible au moins 1,5 × la précédente
    let cible = chiffres.max(connue + connue / 2);
    let v = match cle {
        Cle::Pi => pi_scaled_compute(cible),
        Cle::Ln2 => ln2_scaled_compute(cible),
        Cle::Ln10 => ln10_scaled_compute(cible),
    };
    let r = &v / pow10(cible - chiffres);
    guard.insert(cle, (cible, v));
    r
}

/// arctan(1/q) scalé : 1/q − 1/(3q³) + 1/(5q⁵) − …
fn arctan_inv_q_scaled(q: i64, scale: &BigInt) -> BigInt {
    serie_inv_q(q, scale, true)
}

/// argth(1/q) scalé : 1/q + 1/(3q³) + 1/(5q⁵) + …
fn argth_inv_q_scaled(q: i64, scale: &BigInt) -> BigInt {
    serie_inv_q(q, scale, false)
}

fn serie_inv_q(q: i64, scale: &BigInt, alterne: bool) -> BigInt {
    let q = BigInt::from(q);
    let q2 = &q * &q;

    let mut q_pow = q;
    let mut sum = BigInt::zero();
    let mut k: u64 = 0;

    loop {
        let term = scale / (&q_pow * BigInt::from(2 * k + 1));
        if term.is_zero() {
            break;
        }

        if alterne && k % 2 == 1 {
            sum -= term;
        } else {
            sum += term;
        }

        q_pow *= &q2;
        k += 1;
    }

    sum
}

// extra pour amortir les erreurs de troncature
const EXTRA: usize = 10;

fn pi_scaled_compute(digits: usize) -> BigInt {
    let scale = pow10(digits + EXTRA);

    // Machin : π = 16·atan(1/5) − 4·atan(1/239)
    let a = arctan_inv_q_scaled(5, &scale);
    let b = arctan_inv_q_scaled(239, &scale);

    (BigInt::from(16) * a - BigInt::from(4) * b) / pow10(EXTRA)
}

fn ln2_scaled_compute(digits: usize) -> BigInt {
    let scale = pow10(digits + EXTRA);

    // ln 2 = 2·argth(1/3)
    (argth_inv_q_scaled(3, &scale) * 2) / pow10(EXTRA)
}

fn ln10_scaled_compute(digits: usize) -> BigInt {
    let scale = pow10(digits + EXTRA);

    // ln 10 = 3·ln 2 + ln(5/4) = 6·argth(1/3) + 2·argth(1/9)
    let a = argth_inv_q_scaled(3, &scale);
    let b = argth_inv_q_scaled(9, &scale);

    (a * 6 + b * 2) / pow10(EXTRA)
}

pub fn pi() -> Decimal {
    let w = chiffres_travail();
    Decimal::depuis_fixe(constante(Cle::Pi, w), w)
}

pub fn ln10() -> Decimal {
    let w = chiffres_travail();
    Decimal::depuis_fixe(constante(Cle::Ln10, w), w)
}

/// e = exp(1).
pub fn euler() -> Decimal {
    exp(&Decimal::un()).unwrap_or_else(Decimal::zero)
}

/// π/180 (degrés → radians).
pub fn degre_vers_radian() -> Decimal {
    let w = chiffres_travail();
    let s = constante(Cle::Pi, w + 3) / 180;
    Decimal::depuis_fixe(s, w + 3)
}

/// 180/π (radians → degrés).
pub fn radian_vers_degre() -> Decimal {
    let w = chiffres_travail();
    let s = pow10(2 * w) * 180 / constante(Cle::Pi, w);
    Decimal::depuis_fixe(s, w)
}

/* ------------------------ exp / ln ------------------------ */

/// exp(r) scalé ×10^w, pour |r| ≤ ~1.2.
fn exp_fixe(r: &BigInt, w: usize) -> BigInt {
    // réduction r/2^10 puis 10 élévations au carré
    const DEMI: u32 = 10;
    let w2 = w + 8;
    let s = pow10(w2);

    let y = (r * pow10(8)) >> DEMI;

    let mut sum = s.clone();
    let mut term = s.clone();
    let mut n: u64 = 1;
    loop {
        term = &term * &y / &s / n;
        if term.is_zero() {
            break;
        }
        sum += &term;
        n += 1;
    }

    for _ in 0..DEMI {
        sum = &sum * &sum / &s;
    }

    sum / pow10(8)
}

/// exp(x). None : dépassement de 10^(MAX_EXP+1).
pub fn exp(x: &Decimal) -> Option<Decimal> {
    if x.est_zero() {
        return Some(Decimal::un());
    }

    // |x| ≥ 10^10 : le résultat sort de toute borne (ou s’écrase sur 0)
    if x.exposant10() > 9 {
        return if x.est_negatif() {
            Some(Decimal::zero())
        } else {
            None
        };
    }

    let w = chiffres_travail();
    let w12 = w + 12;

    // x = k·ln 10 + r, |r| ≤ ln(10)/2
    let ln10 = constante(Cle::Ln10, w12);
    let x_s = x.vers_fixe(w12);
    let k = div_arrondie(&x_s, &ln10);
    let r = (&x_s - &k * &ln10) / pow10(12);

    let k = k.to_i64()?;
    if k > MAX_EXP + 1 {
        return None;
    }
    if k < -(MAX_EXP + 1) - 4 {
        return Some(Decimal::zero());
    }

    Some(Decimal::new(exp_fixe(&r, w), k - w as i64))
}

/// argth(z) scalé, |z| ≤ 0.2.
fn argth_fixe(z: &BigInt, s: &BigInt) -> BigInt {
    let z2 = z * z / s;
    let mut sum = z.clone();
    let mut term = z.clone();
    let mut k: u64 = 1;
    loop {
        term = &term * &z2 / s;
        let t = &term / (2 * k + 1);
        if t.is_zero() {
            break;
        }
        sum += t;
        k += 1;
    }
    sum
}

/// ln(x), x > 0 (domaine vérifié par l’appelant).
pub fn ln(x: &Decimal) -> Decimal {
    if x.signum() <= 0 {
        return Decimal::zero();
    }

    let w = chiffres_travail() + 4;
    let s = pow10(w);

    // x = m·10^e, m ∈ [1, 10)
    let e = x.exposant10();
    let m = Decimal::new(x.mantisse().clone(), x.exposant() - e).vers_fixe(w);

    // m = 2^j·t, t ∈ [0.75, 1.5)
    let borne = &s * 3 / 2;
    let mut t = m;
    let mut j: i64 = 0;
    while t >= borne {
        t /= 2;
        j += 1;
    }

    // ln t = 2·argth((t−1)/(t+1))
    let z = (&t - &s) * &s / (&t + &s);
    let ln_t = argth_fixe(&z, &s) * 2;

    let total = ln_t + constante(Cle::Ln2, w) * j + constante(Cle::Ln10, w) * e;
    Decimal::depuis_fixe(total, w)
}

pub fn log10(x: &Decimal) -> Decimal {
    ln(x).diviser(&ln10()).unwrap_or_else(Decimal::zero)
}

/* ------------------------ sin / cos ------------------------ */

/// Au-delà, la réduction modulo 2π coûterait trop cher.
pub const EXPOSANT_ANGLE_MAX: i64 = 400;

/// x mod 2π dans [−π, π], scalé ×10^w. None si |x| est démesuré.
fn reduire_angle(x: &Decimal, w: usize) -> Option<BigInt> {
    let e = x.exposant10();
    if e > EXPOSANT_ANGLE_MAX {
        return None;
    }
    let extra = e.max(0) as usize + 4;
    let w2 = w + extra;

    let deux_pi = constante(Cle::Pi, w2) * 2;
    let x_s = x.vers_fixe(w2);
    let q = div_arrondie(&x_s, &deux_pi);

    Some((x_s - q * deux_pi) / pow10(extra))
}

fn sin_fixe(r: &BigInt, s: &BigInt) -> BigInt {
    let r2 = r * r / s;
    let mut sum = r.clone();
    let mut term = r.clone();
    let mut n: u64 = 1;
    loop {
        term = -(&term * &r2 / s) / ((2 * n) * (2 * n + 1));
        if term.is_zero() {
            break;
        }
        sum += &term;
        n += 1;
    }
    sum
}

fn cos_fixe(r: &BigInt, s: &BigInt) -> BigInt {
    let r2 = r * r / s;
    let mut sum = s.clone();
    let mut term = s.clone();
    let mut n: u64 = 1;
    loop {
        term = -(&term * &r2 / s) / ((2 * n - 1) * (2 * n));
        if term.is_zero() {
            break;
        }
        sum += &term;
        n += 1;
    }
    sum
}

pub fn sin(x: &Decimal) -> Option<Decimal> {
    let w = chiffres_travail();
    let r = reduire_angle(x, w)?;
    Some(Decimal::depuis_fixe(sin_fixe(&r, &pow10(w)), w))
}

pub fn cos(x: &Decimal) -> Option<Decimal> {
    let w = chiffres_travail();
    let r = reduire_angle(x, w)?;
    Some(Decimal::depuis_fixe(cos_fixe(&r, &pow10(w)), w))
}

/* ------------------------ atan / asin / acos ------------------------ */

fn racine_fixe(v: &BigInt, s: &BigInt) -> BigInt {
    (v * s).sqrt()
}

pub fn atan(x: &Decimal) -> Decimal {
    if x.est_zero() {
        return Decimal::zero();
    }

    let w = chiffres_travail() + 4;
    let s = pow10(w);

    let un = Decimal::un();
    let ax = x.abs();
    let inverse = ax > un;
    let a = if inverse {
        ax.inverse().unwrap_or_else(Decimal::zero)
    } else {
        ax
    };

    // atan(a) = 2·atan(a / (1 + √(1 + a²))), trois fois
    let mut a_s = a.vers_fixe(w);
    for _ in 0..3 {
        let a2 = &a_s * &a_s / &s;
        let rac = racine_fixe(&(&s + a2), &s);
        a_s = &a_s * &s / (&s + rac);
    }

    let a2 = &a_s * &a_s / &s;
    let mut sum = a_s.clone();
    let mut term = a_s;
    let mut k: u64 = 1;
    loop {
        term = -(&term * &a2 / &s);
        let t = &term / (2 * k + 1);
        if t.is_zero() {
            break;
        }
        sum += t;
        k += 1;
    }
    sum *= 8;

    if inverse {
        sum = constante(Cle::Pi, w) / 2 - sum;
    }
    if x.est_negatif() {
        sum = -sum;
    }
    Decimal::depuis_fixe(sum, w)
}

/// |x| ≤ 1 (vérifié par l’appelant).
pub fn asin(x: &Decimal) -> Decimal {
    let un = Decimal::un();
    let ax = x.abs();
    if ax >= un {
        let demi_pi = pi().diviser(&Decimal::entier(2)).unwrap_or_else(Decimal::zero);
        return if x.est_negatif() { -demi_pi } else { demi_pi };
    }

    // asin x = atan(x / √(1 − x²))
    let c = racine_carree(&un.soustraire(&x.multiplier(x)));
    match x.diviser(&c) {
        Some(t) => atan(&t),
        None => Decimal::zero(),
    }
}

pub fn acos(x: &Decimal) -> Decimal {
    let demi_pi = pi().diviser(&Decimal::entier(2)).unwrap_or_else(Decimal::zero);
    demi_pi.soustraire(&asin(x))
}

/* ------------------------ Racines ------------------------ */

/// √x, x ≥ 0.
pub fn racine_carree(x: &Decimal) -> Decimal {
    if x.signum() <= 0 {
        return Decimal::zero();
    }

    // x = m·10^e ; m·10^k avec assez de chiffres et (e − k) pair
    let m = x.mantisse();
    let e = x.exposant();
    let voulu = 2 * (PRECISION + 4);
    let mut k = voulu.saturating_sub(nb_chiffres(m)) as i64;
    if (e - k).rem_euclid(2) == 1 {
        k += 1;
    }

    let r = (m * pow10(k as usize)).sqrt();
    Decimal::new(r, (e - k) / 2)
}

/// x^(1/n) pour x > 0 et n quelconque (non nul) : exp(ln x / n).
pub fn racine_reelle(x: &Decimal, n: &Decimal) -> Option<Decimal> {
    let quotient = ln(x).diviser(n)?;
    exp(&quotient)
}

/// a^b pour a > 0 : exp(b·ln a).
pub fn puissance_reelle(a: &Decimal, b: &Decimal) -> Option<Decimal> {
    exp(&b.multiplier(&ln(a)))
}

/* ------------------------ Factorielle ------------------------ */

/// n! en précision Decimal (produit arrondi au fil de l’eau).
pub fn factorielle(n: u64) -> Decimal {
    // ~ (PRECISION + 20) chiffres en bits
    let limite_bits = ((PRECISION + 20) * 10 / 3) as u64;
    let garde = PRECISION + 10;

    let mut m = BigInt::one();
    let mut e: i64 = 0;
    for i in 2..=n {
        m *= i;
        if m.bits() > limite_bits {
            let k = nb_chiffres(&m) - garde;
            m = div_arrondie(&m, &pow10(k));
            e += k as i64;
        }
    }
    Decimal::new(m, e)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    /// Compare à 40 chiffres significatifs.
    fn proche(a: &Decimal, attendu: &str) {
        assert_eq!(
            a.arrondi_significatif(40),
            d(attendu).arrondi_significatif(40),
            "obtenu {a}"
        );
    }

    #[test]
    fn pi_machin() {
        proche(&pi(), "3.14159265358979323846264338327950288419716939937510");
    }

    #[test]
    fn pi_cache_stable() {
        assert_eq!(constante(Cle::Pi, 30), constante(Cle::Pi, 30));
        assert_eq!(constante(Cle::Pi, 5), BigInt::from(314_159));

        // une seule entrée par constante : les précisions basses en sont tirées
        let haute = constante(Cle::Pi, 300);
        assert_eq!(constante(Cle::Pi, 250), &haute / pow10(50));
        let guard = CONSTANTES.get().unwrap().lock().unwrap();
        assert!(guard.get(&Cle::Pi).is_some_and(|(p, _)| *p >= 300));
    }

    #[test]
    fn logarithmes() {
        proche(&ln10(), "2.30258509299404568401799145468436420760110148862877");
        proche(&ln(&d("2")), "0.69314718055994530941723212145817656807550013436026");
        proche(&ln(&d("0.5")), "-0.69314718055994530941723212145817656807550013436026");
        assert_eq!(log10(&d("1000")).arrondi_significatif(30), d("3"));
    }

    #[test]
    fn exponentielle() {
        proche(&euler(), "2.71828182845904523536028747135266249775724709369995");
        proche(&exp(&d("-1")).unwrap(), "0.36787944117144232159552377016146086744581113103176");
        assert!(exp(&d("1e12")).is_none());
        assert_eq!(exp(&d("-1e12")), Some(Decimal::zero()));
    }

    #[test]
    fn exponentielle_grande_sans_debordement() {
        // exp(1000) ≈ 1.970071114017e434
        let v = exp(&d("1000")).unwrap();
        assert_eq!(v.exposant10(), 434);
    }

    #[test]
    fn trigonometrie() {
        proche(&sin(&d("1")).unwrap(), "0.84147098480789650665250232163029899962256306079837");
        proche(&cos(&d("1")).unwrap(), "0.54030230586813971740093660744297660373231042061792");
        let x = pi().diviser(&d("6")).unwrap();
        assert_eq!(sin(&x).unwrap().arrondi_significatif(30), d("0.5"));
        assert!(sin(&d("1e20000")).is_none());
        assert!(sin(&d("1e401")).is_none());
        assert!(cos(&d("1e400")).is_some());
    }

    #[test]
    fn arcs() {
        let quart_pi = pi().diviser(&d("4")).unwrap();
        proche(&atan(&d("1")), &quart_pi.to_string().replace('E', "e"));
        proche(&atan(&d("-2")), "-1.10714871779409050301706546017853704007004764540143");
        let sixieme_pi = pi().diviser(&d("6")).unwrap();
        assert_eq!(
            asin(&d("0.5")).arrondi_significatif(40),
            sixieme_pi.arrondi_significatif(40)
        );
        assert_eq!(acos(&d("1")).arrondi_significatif(30), Decimal::zero());
    }

    #[test]
    fn racines() {
        assert_eq!(racine_carree(&d("2.25")), d("1.5"));
        proche(&racine_carree(&d("2")), "1.41421356237309504880168872420969807856967187537694");
        proche(&racine_carree(&d("0.02")), "0.14142135623730950488016887242096980785696718753769");
        let r = racine_reelle(&d("27"), &d("3")).unwrap();
        assert_eq!(r.arrondi_significatif(30), d("3"));
    }

    #[test]
    fn factorielles() {
        assert_eq!(factorielle(0), Decimal::un());
        assert_eq!(factorielle(5), d("120"));
        assert_eq!(factorielle(25), d("15511210043330985984000000"));
        // 100! ≈ 9.332621544394415e157
        let f = factorielle(100);
        assert_eq!(f.exposant10(), 157);
        assert_eq!(f.arrondi_significatif(16), d("9.332621544394415e157"));
    }
}
