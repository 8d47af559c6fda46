//! Calculatrice clavier : évaluation exacte quand c’est possible, décimale sinon.
//!
//! ```
//! use calculatrice_clavier::{eval_expression, Config};
//!
//! let e = eval_expression("1÷2+1÷3", &Config::default()).unwrap();
//! assert_eq!(e.affichage, "5/6");
//! ```

pub mod noyau;

pub use noyau::{
    eval_expression, evaluate_formula, format_litteral, format_nombre, Config, ErreurCalcul,
    Evaluation, Nombre, Reglages, Resultat, StyleFraction, TableConstantes, UniteAngle,
};
