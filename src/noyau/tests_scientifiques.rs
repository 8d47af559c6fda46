//! Tests scientifiques (campagne) : propriétés clés + genres d’erreur + limites contrôlées.
//!
//! But : vérifier le pipeline complet (tokenize → canon → eval → format) sans faire
//! chauffer la machine.
//! - tables rstest pour les valeurs attendues
//! - budget temps global sur les stress
//! - exactitude vérifiée via la démarche (`demarche.exact`)
//!
//! Notes :
//! - Mode degré par défaut : sin/cos/tan des multiples de 15° sont exacts.
//! - Une constante (π, e, nommée) fait passer tout le calcul en décimal, même si la
//!   valeur finale est « ronde ».

use std::time::{Duration, Instant};

use rstest::rstest;

use super::{
    eval_expression, evaluate_formula, Config, ErreurCalcul, Nombre, Reglages, StyleFraction,
};

fn eval_ok(expr: &str, config: &Config) -> (String, bool) {
    let e = eval_expression(expr, config).unwrap_or_else(|e| panic!("expr={expr:?} err={e}"));
    (e.affichage, e.demarche.exact)
}

fn assert_exact_eq(expr: &str, attendu: &str) {
    let (aff, exact) = eval_ok(expr, &Config::default());
    assert_eq!(aff, attendu, "expr={expr:?}");
    assert!(exact, "expr={expr:?} devrait rester exact");
}

fn assert_decimal_eq(expr: &str, attendu: &str) {
    let (aff, exact) = eval_ok(expr, &Config::default());
    assert_eq!(aff, attendu, "expr={expr:?}");
    assert!(!exact, "expr={expr:?} devrait être décimal");
}

fn mixte() -> Config {
    Config::avec_reglages(Reglages {
        style_fraction: StyleFraction::Mixte,
        ..Reglages::default()
    })
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Arithmétique exacte ------------------------ */

#[rstest]
#[case("2+3×4", "14")]
#[case("2×3+4×5", "26")]
#[case("10-4-3", "3")]
#[case("100÷10÷5", "2")]
#[case("1/2", "1/2")]
#[case("1÷2+1÷3", "5/6")]
#[case("1/2/3", "5/3")]
#[case("2(3)", "6")]
#[case("2×(3)", "6")]
#[case("(2+3", "5")]
#[case("((1+2)×(3+4", "21")]
#[case("-(2+3)", "-5")]
#[case("50%", "1/2")]
#[case("5!", "120")]
#[case("0!", "1")]
#[case("(2/3)²", "4/9")]
#[case("1.5E2", "150")]
#[case("2E(3)", "2000")]
#[case("2^(10)", "1024")]
#[case("2^(-2)", "1/4")]
#[case("√(16)", "4")]
#[case("3x√(27)", "3")]
#[case("log(1000)", "3")]
#[case("log(2,8)", "3")]
#[case("", "0")]
fn sci_valeurs_exactes(#[case] expr: &str, #[case] attendu: &str) {
    assert_exact_eq(expr, attendu);
}

/* ------------------------ Trigonométrie (degrés / radians) ------------------------ */

#[rstest]
#[case("sin(90)", "1")]
#[case("sin(30)", "1/2")]
#[case("sin(-30)", "-1/2")]
#[case("sin(390)", "1/2")]
#[case("cos(60)", "1/2")]
#[case("cos(180)", "-1")]
#[case("tan(45)", "1")]
#[case("tan(135)", "-1")]
#[case("cot(45)", "1")]
#[case("sec(60)", "2")]
#[case("csc(30)", "2")]
fn sci_angles_remarquables_degres(#[case] expr: &str, #[case] attendu: &str) {
    assert_exact_eq(expr, attendu);
}

#[test]
fn sci_sinus_selon_unite() {
    let deg = evaluate_formula("sin(90)", &Config::default()).unwrap();
    assert_eq!(deg, Nombre::entier(1));

    let rad = evaluate_formula("sin(90)", &Config::radians()).unwrap();
    assert!(!rad.est_exact());
    assert_ne!(rad, Nombre::entier(1));
    assert!((rad.vers_f64() - 0.893_996_663_600_557_9).abs() < 1e-12);
}

#[test]
fn sci_arc_trigo_en_degres() {
    assert_exact_eq("arcsin(1/2)", "30");
    assert_exact_eq("arccos(0)", "90");
    assert_exact_eq("arctan(1)", "45");
}

#[rstest]
#[case("arcsec(2)", "60")]
#[case("arcsec(-1)", "180")]
#[case("arccsc(2)", "30")]
#[case("arccsc(-2)", "-30")]
fn sci_arcs_reciproques(#[case] expr: &str, #[case] attendu: &str) {
    assert_exact_eq(expr, attendu);
}

#[rstest]
#[case("arcsec(0.5)", Config::default())]
#[case("arccsc(-0.5)", Config::default())]
#[case("arcsec(0)", Config::default())]
#[case("tan(π÷2)", Config::radians())]
#[case("sec(π÷2)", Config::radians())]
#[case("csc(π)", Config::radians())]
#[case("cot(π)", Config::radians())]
fn sci_domaines_trigo(#[case] expr: &str, #[case] config: Config) {
    match evaluate_formula(expr, &config) {
        Err(ErreurCalcul::Math(_)) => {}
        autre => panic!("expr={expr:?} : attendu Math, obtenu {autre:?}"),
    }
}

/* ------------------------ Passage au décimal ------------------------ */

#[test]
fn sci_exactitude_perdue() {
    // la valeur est ronde mais le calcul est passé en décimal
    assert_decimal_eq("√(2)×√(2)", "2");
    assert_decimal_eq("π÷π", "1");
    assert_decimal_eq("π", "3.14159265358979");
    assert_decimal_eq("e", "2.71828182845905");
    assert_decimal_eq("√(2)", "1.4142135623731");
    assert_decimal_eq("2147483648+1", "2147483649");
}

#[test]
fn sci_notation_auto() {
    assert_decimal_eq("√(2)×1E(20)", "1.4142135623731e+20");
    assert_decimal_eq("√(2)÷1E(9)", "1.4142135623731e-9");
}

#[test]
fn sci_carre_hors_borne() {
    // 2.5e9 dépasse la borne rationnelle : décimal, pas d’erreur
    assert_decimal_eq("50000²", "2500000000");
    match evaluate_formula("(1E9999999)²", &Config::default()) {
        Err(ErreurCalcul::Math(m)) => assert!(m.contains("trop grande"), "{m}"),
        autre => panic!("attendu Math, obtenu {autre:?}"),
    }
}

/* ------------------------ Exposants extrêmes ------------------------ */

#[rstest]
#[case("1E-9223372036854775808")]
#[case("1E-99999999999999999999")]
#[case("1E-5000000000000000000×1E-5000000000000000000")]
#[case("1E-9223372036854775807÷1E9")]
#[case("1E-5000000000000000000²")]
#[case("2.5E-9223372036854775808+0")]
fn sci_exposant_negatif_demesure_vaut_zero(#[case] expr: &str) {
    let (aff, exact) = eval_ok(expr, &Config::default());
    assert_eq!(aff, "0", "expr={expr:?}");
    assert!(!exact, "expr={expr:?}");
}

#[rstest]
#[case("1E9223372036854775807")]
#[case("1E99999999999999999999")]
#[case("1E5000000000000000000÷1E-5000000000000000000")]
fn sci_exposant_positif_demesure_trop_grand(#[case] expr: &str) {
    match evaluate_formula(expr, &Config::default()) {
        Err(ErreurCalcul::Math(_)) => {}
        autre => panic!("expr={expr:?} : attendu Math, obtenu {autre:?}"),
    }
}

/* ------------------------ Styles de fraction ------------------------ */

#[rstest]
#[case("7÷2", "7/2", "3/1/2")]
#[case("-7÷2", "-7/2", "-3/1/2")]
#[case("1÷3", "1/3", "1/3")]
#[case("6÷3", "2", "2")]
fn sci_styles_de_fraction(#[case] expr: &str, #[case] impropre: &str, #[case] mixte_attendu: &str) {
    let (aff, _) = eval_ok(expr, &Config::default());
    assert_eq!(aff, impropre, "expr={expr:?}");
    let (aff, _) = eval_ok(expr, &mixte());
    assert_eq!(aff, mixte_attendu, "expr={expr:?}");
}

/* ------------------------ Genres d’erreur ------------------------ */

#[rstest]
#[case("1÷0")]
#[case("1/0")]
#[case("log(1,5)")]
#[case("log(0)")]
#[case("ln(-1)")]
#[case("√(-1)")]
#[case("1723508!")]
#[case("(-1)!")]
#[case("0.5!")]
#[case("tan(90)")]
#[case("cot(0)")]
#[case("arcsin(2)")]
#[case("arccot(0)")]
#[case("0x√(5)")]
#[case("0^(-1)")]
#[case("10^(10000000)")]
fn sci_erreurs_math(#[case] expr: &str) {
    match evaluate_formula(expr, &Config::default()) {
        Err(ErreurCalcul::Math(_)) => {}
        autre => panic!("expr={expr:?} : attendu Math, obtenu {autre:?}"),
    }
}

#[rstest]
#[case("2+3)")]
#[case("×2")]
#[case("2+")]
#[case("()")]
#[case("sin()")]
#[case("sin")]
#[case("1..2")]
#[case("1/2/3/4")]
#[case("log(1,2,3)")]
#[case("2,3")]
#[case("2×÷3")]
#[case("2+×3")]
#[case("(2^)")]
fn sci_erreurs_syntaxe(#[case] expr: &str) {
    match evaluate_formula(expr, &Config::default()) {
        Err(ErreurCalcul::Syntaxe(_)) => {}
        autre => panic!("expr={expr:?} : attendu Syntaxe, obtenu {autre:?}"),
    }
}

#[test]
fn sci_message_depassement() {
    let e = evaluate_formula("1723508!", &Config::default()).unwrap_err();
    assert_eq!(e.titre(), "Erreur mathématique");
    assert!(e.message().contains("exp(10000000)"), "{e}");
}

/* ------------------------ Réponse précédente + constantes ------------------------ */

#[test]
fn sci_chaine_de_reponses() {
    let mut config = Config::default();
    for (expr, attendu) in [("7÷2", "7/2"), ("Ans×2", "7"), ("Ans²", "49"), ("√(Ans)", "7")] {
        let e = eval_expression(expr, &config).unwrap_or_else(|e| panic!("expr={expr:?} err={e}"));
        assert_eq!(e.affichage, attendu, "expr={expr:?}");
        config.reponse = e.valeur;
    }
}

#[test]
fn sci_constantes_utilisateur() {
    let mut config = Config::default();
    config.constantes.definir("g", "9.81").unwrap();
    config.constantes.definir("moitie", "1/2").unwrap();

    assert_decimal_eq_avec(&config, "2g", "19.62");
    assert_decimal_eq_avec(&config, "4moitie", "2");
    // plus long nom d’abord : « sin » n’est pas découpé par une constante « s »
    config.constantes.definir("s", "3").unwrap();
    assert_decimal_eq_avec(&config, "s×sin(30)", "1.5");
}

#[test]
fn sci_constante_finissant_par_e() {
    let mut config = Config::default();
    assert!(config.constantes.definir("vE", "1").is_err());
    config.constantes.definir("Ev", "1").unwrap();
    assert_decimal_eq_avec(&config, "2Ev", "2");
}

fn assert_decimal_eq_avec(config: &Config, expr: &str, attendu: &str) {
    let (aff, exact) = eval_ok(expr, config);
    assert_eq!(aff, attendu, "expr={expr:?}");
    assert!(!exact, "expr={expr:?}");
}

/* ------------------------ Stress contrôlé ------------------------ */

#[test]
fn sci_stress_somme_longue() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    let expr = vec!["1/2"; 400].join("+");
    budget(t0, max);

    assert_exact_eq(&expr, "200");
    budget(t0, max);
}

#[test]
fn sci_stress_profondeur_parentheses() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    // fermetures automatiques : 150 `(` sans `)`
    let expr = format!("{}1+1", "(".repeat(150));
    assert_exact_eq(&expr, "2");
    budget(t0, max);
}

#[test]
fn sci_stress_grand_angle_radians() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    for expr in ["sin(1E400)", "sin(1E399)", "cos(1E398)", "sin(3E400)"] {
        let v = evaluate_formula(expr, &Config::radians())
            .unwrap_or_else(|e| panic!("expr={expr:?} err={e}"));
        assert!(v.vers_f64().abs() <= 1.0, "expr={expr:?}");
        budget(t0, max);
    }

    assert!(matches!(
        evaluate_formula("sin(1E401)", &Config::radians()),
        Err(ErreurCalcul::Math(_))
    ));
    budget(t0, max);
}

#[test]
fn sci_stress_grands_entiers() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    // au-delà de la borne rationnelle : décimal, pas d’erreur
    let big = "9".repeat(100);
    let (aff, exact) = eval_ok(&format!("{big}÷7+1÷7"), &Config::default());
    assert!(!exact);
    assert_eq!(aff, "1.42857142857143e+99");
    budget(t0, max);

    // 170! dépasse la borne : quotient décimal, rendu rond
    assert_decimal_eq("170!÷169!", "170");
    budget(t0, max);
}
