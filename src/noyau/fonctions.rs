// src/noyau/fonctions.rs
//
// Application des fonctions (domaines + exactitude)
// -------------------------------------------------
// Chaque règle vérifie son domaine (erreur Math sinon), calcule en décimal
// (ou en rationnel exact quand c’est bon marché), puis passe par
// `issue_fonction` : le test de rationalité décide si le calcul reste exact.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::config::UniteAngle;
use super::decimal::{nb_chiffres, Decimal};
use super::erreur::{division_par_zero, trop_grand, ErreurCalcul, Resultat};
use super::eval::Evaluateur;
use super::jetons::Fonction;
use super::nombre::{depasse_maximum, Nombre, MAX_EXP, MAX_FACTORIAL_ARG};
use super::transcendant::{
    self, acos, asin, atan, cos, degre_vers_radian, ln, log10, puissance_reelle, racine_carree,
    racine_reelle, radian_vers_degre, sin,
};
use super::trig::{trig_special_degres, TrigFn, TrigOutcome};

/// Sous 10^-40 (pour un angle ≥ 10^-30), sin/cos comptent pour zéro.
const EXP_ZERO_TRIGO: i64 = -40;
const EXP_ANGLE_NON_NUL: i64 = -30;

/// Au-delà (chiffres estimés du résultat), a^n passe par exp/ln.
const CHIFFRES_PUISSANCE_EXACTE: u64 = 20_000;

impl Evaluateur<'_> {
    /* ------------------------ Fonctions avant ------------------------ */

    pub(super) fn appliquer(&mut self, f: Fonction, x: Nombre) -> Resultat<Nombre> {
        match f {
            Fonction::Racine => {
                if x.est_negatif() {
                    return Err(ErreurCalcul::math(
                        "L’argument de √ doit être positif ou nul.",
                    ));
                }
                let v = racine_carree(&x.vers_decimal());
                Ok(self.issue_fonction(v, "√"))
            }

            Fonction::Log | Fonction::Ln => {
                if x.signum() <= 0 {
                    return Err(ErreurCalcul::math(format!(
                        "L’argument de {f} doit être strictement positif."
                    )));
                }
                let d = x.vers_decimal();
                let v = if f == Fonction::Log { log10(&d) } else { ln(&d) };
                Ok(self.issue_fonction(v, f.symbole()))
            }

            f if f.est_trigo() => self.trigo(f, x),
            f if f.est_arc_trigo() => self.arc_trigo(f, x),

            _ => Err(ErreurCalcul::interne(format!(
                "eval : « {f} » n’est pas une fonction à un argument"
            ))),
        }
    }

    /// log(b, x) = ln x / ln b
    pub(super) fn appliquer_virgules(&mut self, f: Fonction, args: Vec<Nombre>) -> Resultat<Nombre> {
        match (f, args.as_slice()) {
            (Fonction::Log, [base, x]) => {
                if base.signum() <= 0 || base.est_un() {
                    return Err(ErreurCalcul::math(
                        "La base de log doit être strictement positive et différente de 1.",
                    ));
                }
                if x.signum() <= 0 {
                    return Err(ErreurCalcul::math(
                        "L’argument de log doit être strictement positif.",
                    ));
                }
                let v = ln(&x.vers_decimal())
                    .diviser(&ln(&base.vers_decimal()))
                    .ok_or_else(division_par_zero)?;
                Ok(self.issue_fonction(v, "log"))
            }
            _ => Err(ErreurCalcul::interne(format!(
                "eval : {f} ne prend pas {} arguments",
                args.len()
            ))),
        }
    }

    /* ------------------------ Trigonométrie ------------------------ */

    fn trigo(&mut self, f: Fonction, x: Nombre) -> Resultat<Nombre> {
        let tf = TrigFn::depuis(f)
            .ok_or_else(|| ErreurCalcul::interne(format!("eval : « {f} » n’est pas trigonométrique")))?;
        let degres = self.config.reglages.unite_angle == UniteAngle::Degre;

        // angles remarquables (degrés, valeur exacte)
        if degres {
            let angle = match &x {
                Nombre::Exact(q) => Some(q.clone()),
                Nombre::Approx(d) => d.vers_rationnel(),
            };
            if let Some(issue) = angle.and_then(|a| trig_special_degres(&a, tf)) {
                return match issue {
                    TrigOutcome::Valeur(q, preuve) => {
                        self.preuve.push(preuve);
                        Ok(self.issue_exacte(q))
                    }
                    TrigOutcome::Indefini(preuve) => {
                        self.preuve.push(preuve);
                        Err(hors_domaine_trigo(tf))
                    }
                };
            }
        }

        let mut angle = x.vers_decimal();
        if degres {
            angle = angle.multiplier(&degre_vers_radian());
        }

        let (s, c) = match (sin(&angle), cos(&angle)) {
            (Some(s), Some(c)) => (presque_zero(s, &angle), presque_zero(c, &angle)),
            _ => {
                return Err(ErreurCalcul::math(format!(
                    "L’angle de {} est trop grand.",
                    tf.nom()
                )))
            }
        };

        // tan, sec : cos = 0 ; csc, cot : sin = 0
        let quotient = |a: &Decimal, b: &Decimal| a.diviser(b).ok_or_else(|| hors_domaine_trigo(tf));
        let v = match tf {
            TrigFn::Sin => s,
            TrigFn::Cos => c,
            TrigFn::Tan => quotient(&s, &c)?,
            TrigFn::Sec => quotient(&Decimal::un(), &c)?,
            TrigFn::Csc => quotient(&Decimal::un(), &s)?,
            TrigFn::Cot => quotient(&c, &s)?,
        };
        Ok(self.issue_fonction(v, tf.nom()))
    }

    fn arc_trigo(&mut self, f: Fonction, x: Nombre) -> Resultat<Nombre> {
        let d = x.vers_decimal();
        let un = Decimal::un();

        let rad = match f {
            Fonction::ArcSin | Fonction::ArcCos => {
                if d.abs() > un {
                    return Err(ErreurCalcul::math(format!(
                        "L’argument de {f} doit être compris entre -1 et 1."
                    )));
                }
                if f == Fonction::ArcSin {
                    asin(&d)
                } else {
                    acos(&d)
                }
            }

            Fonction::ArcTan => atan(&d),

            Fonction::ArcSec | Fonction::ArcCsc => {
                let inv = d.inverse().filter(|i| i.abs() <= un).ok_or_else(|| {
                    ErreurCalcul::math(format!("L’argument de {f} doit être ≤ -1 ou ≥ 1."))
                })?;
                if f == Fonction::ArcSec {
                    acos(&inv)
                } else {
                    asin(&inv)
                }
            }

            Fonction::ArcCot => {
                let inv = d
                    .inverse()
                    .ok_or_else(|| ErreurCalcul::math("L’argument de arccot ne peut pas être nul."))?;
                atan(&inv)
            }

            _ => {
                return Err(ErreurCalcul::interne(format!(
                    "eval : « {f} » n’est pas une fonction circulaire réciproque"
                )))
            }
        };

        let v = if self.config.reglages.unite_angle == UniteAngle::Degre {
            rad.multiplier(&radian_vers_degre())
        } else {
            rad
        };
        Ok(self.issue_fonction(v, f.symbole()))
    }

    /* ------------------------ Fonctions arrière ------------------------ */

    pub(super) fn appliquer_arriere(
        &mut self,
        f: Fonction,
        gauche: Nombre,
        droite: Nombre,
    ) -> Resultat<Nombre> {
        match f {
            Fonction::Puissance => self.puissance(gauche, droite),
            Fonction::RacineN => self.racine_n(gauche, droite),
            Fonction::Exposant => self.exposant(gauche, droite),
            _ => Err(ErreurCalcul::interne(format!(
                "eval : « {f} » n’est pas une fonction arrière"
            ))),
        }
    }

    /// a^b
    fn puissance(&mut self, a: Nombre, b: Nombre) -> Resultat<Nombre> {
        let n = b.entier_de();

        if a.est_zero() {
            let v = match b.signum() {
                s if s < 0 => return Err(division_par_zero()),
                0 => Decimal::un(),
                _ => Decimal::zero(),
            };
            return Ok(self.issue_fonction(v, "^"));
        }

        // base rationnelle, exposant entier : calcul exact si la taille le permet
        if let (Nombre::Exact(q), Some(n)) = (&a, &n) {
            if let Some(r) = puissance_exacte(q, n) {
                let d = Decimal::depuis_rationnel(&r);
                if depasse_maximum(&d) {
                    return Err(trop_grand());
                }
                return Ok(self.issue_fonction(d, "^"));
            }
        }

        let base = a.vers_decimal();
        let negatif = if base.est_negatif() {
            match (&n, &b) {
                (Some(n), _) => est_impair(n),
                (None, Nombre::Exact(q)) if est_impair(q.denom()) => est_impair(q.numer()),
                _ => {
                    return Err(ErreurCalcul::math(
                        "Une base négative exige un exposant entier ou une fraction à dénominateur impair.",
                    ))
                }
            }
        } else {
            false
        };

        let expo = match &n {
            Some(n) => Decimal::entier(n.clone()),
            None => b.vers_decimal(),
        };
        let m = puissance_reelle(&base.abs(), &expo).ok_or_else(trop_grand)?;
        if depasse_maximum(&m) {
            return Err(trop_grand());
        }
        Ok(self.issue_fonction(if negatif { -m } else { m }, "^"))
    }

    /// n x√ (x) : racine n-ième de x
    fn racine_n(&mut self, indice: Nombre, x: Nombre) -> Resultat<Nombre> {
        if indice.est_zero() {
            return Err(ErreurCalcul::math("L’indice de x√ ne peut pas être nul."));
        }

        let k = indice.entier_de();
        let negatif = x.est_negatif();
        if negatif && !k.as_ref().is_some_and(est_impair) {
            return Err(ErreurCalcul::math(
                "Un radicande négatif exige un indice entier impair.",
            ));
        }

        if x.est_zero() {
            if indice.est_negatif() {
                return Err(division_par_zero());
            }
            return Ok(self.issue_fonction(Decimal::zero(), "x√"));
        }

        let idx = match &k {
            Some(k) => Decimal::entier(k.clone()),
            None => indice.vers_decimal(),
        };
        let m = racine_reelle(&x.vers_decimal().abs(), &idx).ok_or_else(trop_grand)?;
        if depasse_maximum(&m) {
            return Err(trop_grand());
        }
        Ok(self.issue_fonction(if negatif { -m } else { m }, "x√"))
    }

    /// a E(k) = a × 10^k
    fn exposant(&mut self, base: Nombre, k: Nombre) -> Resultat<Nombre> {
        let k = k
            .entier_de()
            .ok_or_else(|| ErreurCalcul::math("L’exposant de E doit être un entier."))?;

        let k = match k.to_i64() {
            Some(k) if k.abs() <= 2 * MAX_EXP => k,
            // 10^(très négatif) : s’écrase sur zéro
            _ if k.is_negative() => return Ok(self.issue_fonction(Decimal::zero(), "E")),
            _ => return Err(trop_grand()),
        };

        let b = base.vers_decimal();
        let v = Decimal::new(b.mantisse().clone(), b.exposant() + k);
        if depasse_maximum(&v) {
            return Err(trop_grand());
        }
        Ok(self.issue_fonction(v, "E"))
    }

    /* ------------------------ Postfixes ------------------------ */

    pub(super) fn carre(&mut self, x: Nombre) -> Resultat<Nombre> {
        match x {
            Nombre::Exact(q) if self.exact => Ok(self.ajuster(Nombre::Exact(&q * &q))),
            x => {
                let d = x.vers_decimal();
                let v = d.multiplier(&d);
                if depasse_maximum(&v) {
                    return Err(trop_grand());
                }
                Ok(self.ajuster(Nombre::Approx(v)))
            }
        }
    }

    pub(super) fn factorielle(&mut self, x: Nombre) -> Resultat<Nombre> {
        let domaine = || ErreurCalcul::math("La factorielle exige un entier positif ou nul.");

        let n = x
            .entier_de()
            .filter(|n| !n.is_negative())
            .ok_or_else(domaine)?;
        if n > BigInt::from(MAX_FACTORIAL_ARG) {
            return Err(trop_grand());
        }
        let n = n.to_u64().ok_or_else(domaine)?;

        let v = transcendant::factorielle(n);
        if depasse_maximum(&v) {
            return Err(trop_grand());
        }
        Ok(self.issue_fonction(v, "!"))
    }
}

/* ------------------------ Outils ------------------------ */

fn hors_domaine_trigo(tf: TrigFn) -> ErreurCalcul {
    let annule = if tf.divise_par_cos() { "cos" } else { "sin" };
    ErreurCalcul::math(format!(
        "{} n’est pas défini pour cet angle ({annule} = 0).",
        tf.nom()
    ))
}

/// Bruit d’arrondi autour d’un zéro de sin/cos.
fn presque_zero(v: Decimal, angle: &Decimal) -> Decimal {
    if !v.est_zero()
        && !angle.est_zero()
        && angle.exposant10() >= EXP_ANGLE_NON_NUL
        && v.exposant10() < EXP_ZERO_TRIGO
    {
        Decimal::zero()
    } else {
        v
    }
}

fn est_impair(n: &BigInt) -> bool {
    !(n % BigInt::from(2)).is_zero()
}

/// q^n exact, si le résultat reste de taille raisonnable.
fn puissance_exacte(q: &BigRational, n: &BigInt) -> Option<BigRational> {
    let n = n.to_i64()?;
    let taille = (nb_chiffres(q.numer()) + nb_chiffres(q.denom())) as u64;
    if n.unsigned_abs().saturating_mul(taille) > CHIFFRES_PUISSANCE_EXACTE {
        return None;
    }
    Some(rational_pow_int(q.clone(), n))
}

/// Exponentiation rapide sur Q (base non nulle si exp < 0).
fn rational_pow_int(base: BigRational, exp: i64) -> BigRational {
    if exp < 0 {
        return rational_pow_int(base, -exp).recip();
    }

    let mut e = exp as u64;
    let mut acc = BigRational::one();
    let mut b = base;

    while e > 0 {
        if (e & 1) == 1 {
            acc *= b.clone();
        }
        e >>= 1;
        if e > 0 {
            b *= b.clone();
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: i64, d: i64) -> BigRational {
        BigRational::new(n.into(), d.into())
    }

    #[test]
    fn puissance_rationnelle_rapide() {
        assert_eq!(rational_pow_int(q(2, 3), 3), q(8, 27));
        assert_eq!(rational_pow_int(q(2, 3), -2), q(9, 4));
        assert_eq!(rational_pow_int(q(-5, 1), 0), q(1, 1));
    }

    #[test]
    fn puissance_exacte_bornee() {
        assert!(puissance_exacte(&q(2, 1), &BigInt::from(100)).is_some());
        assert!(puissance_exacte(&q(2, 1), &BigInt::from(1_000_000)).is_none());
    }

    #[test]
    fn parite() {
        assert!(est_impair(&BigInt::from(3)));
        assert!(est_impair(&BigInt::from(-3)));
        assert!(!est_impair(&BigInt::from(0)));
    }

    #[test]
    fn bruit_trigonometrique() {
        let angle: Decimal = "3.14".parse().unwrap();
        let bruit: Decimal = "1e-45".parse().unwrap();
        assert_eq!(presque_zero(bruit.clone(), &angle), Decimal::zero());
        let minuscule: Decimal = "1e-35".parse().unwrap();
        assert_eq!(presque_zero(bruit.clone(), &minuscule), bruit);
    }
}
