//! Tests fuzz safe : robustesse + déterminisme + cohérence arithmétique.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - générateurs proptest bornés (longueur, alphabet du clavier)
//! - invariant clé : jamais d’erreur `Interne` sur une saisie utilisateur
//! - même formule => même résultat
//! - la réponse affichée se relit sans perte via Ans

use num_bigint::BigInt;
use num_rational::BigRational;
use proptest::prelude::*;

use super::{evaluate_formula, format_litteral, Config, ErreurCalcul, Nombre};

/* ------------------------ Génération de formules (bornée) ------------------------ */

/// Morceaux du clavier, hors puissances et factorielle (coût non borné).
fn morceau() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "1", "2", "7", "12", "0", "0.5", "3E2", "+", "-", "×", "÷", "/", "(", ")", "²", "%", "√",
        "sin", "cos", "log", ",", "π", "Ans",
    ])
}

fn formule() -> impl Strategy<Value = String> {
    prop::collection::vec(morceau(), 0..14).prop_map(|m| m.concat())
}

fn eval(expr: &str, config: &Config) -> Result<Nombre, ErreurCalcul> {
    evaluate_formula(expr, config)
}

fn entier(n: i64) -> Nombre {
    Nombre::entier(n)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn fuzz_jamais_d_erreur_interne(expr in formule()) {
        let config = Config { reponse: Nombre::fraction(-7, 2), ..Config::default() };
        if let Err(ErreurCalcul::Interne(m)) = eval(&expr, &config) {
            panic!("erreur interne: expr={expr:?} msg={m}");
        }
    }

    #[test]
    fn fuzz_determinisme(expr in formule()) {
        let config = Config::default();
        prop_assert_eq!(eval(&expr, &config), eval(&expr, &config));
    }

    #[test]
    fn fuzz_somme_et_produit(a in -1000i64..1000, b in -1000i64..1000, c in -1000i64..1000) {
        let config = Config::default();
        prop_assert_eq!(eval(&format!("{a}+{b}×{c}"), &config), Ok(entier(a + b * c)));
        prop_assert_eq!(eval(&format!("{a}-{b}-{c}"), &config), Ok(entier(a - b - c)));
        prop_assert_eq!(eval(&format!("{a}×({b}+{c})"), &config), Ok(entier(a * (b + c))));
    }

    #[test]
    fn fuzz_quotient_exact(a in -10_000i64..10_000, b in 1i64..10_000, neg in any::<bool>()) {
        let b = if neg { -b } else { b };
        let attendu = Nombre::Exact(BigRational::new(BigInt::from(a), BigInt::from(b)));
        prop_assert_eq!(eval(&format!("{a}÷{b}"), &Config::default()), Ok(attendu.clone()));
        prop_assert_eq!(eval(&format!("{a}/{b}"), &Config::default()), Ok(attendu));
    }

    #[test]
    fn fuzz_reponse_relue_sans_perte(expr in formule()) {
        let Ok(valeur) = eval(&expr, &Config::default()) else {
            return Ok(());
        };
        // un décimal rond peut redevenir exact à la relecture : on compare les valeurs
        let config = Config { reponse: valeur.clone(), ..Config::default() };
        let relu = eval("Ans", &config);
        prop_assert!(relu.is_ok(), "littéral {} : {:?}", format_litteral(&valeur), relu);
        if let Ok(relu) = relu {
            prop_assert_eq!(relu.vers_decimal(), valeur.vers_decimal(), "littéral {}", format_litteral(&valeur));
        }
    }
}

#[test]
fn fuzz_division_par_zero_toujours_math() {
    for expr in ["1÷0", "1/0", "2÷(1-1)", "0÷0", "5/(3-3)", "1/2/0"] {
        assert!(
            matches!(eval(expr, &Config::default()), Err(ErreurCalcul::Math(_))),
            "expr={expr:?}"
        );
    }
}

#[test]
fn fuzz_barres_relancees_par_les_groupes() {
    // (1)/(2)/(3)/(4) = (1 + 2/3)/4
    assert_eq!(
        eval("(1)/(2)/(3)/(4)", &Config::default()),
        Ok(Nombre::fraction(5, 12))
    );
}
