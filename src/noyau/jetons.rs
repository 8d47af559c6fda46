// src/noyau/jetons.rs
//
// Tokenisation de la formule clavier
// ----------------------------------
// - contrôles structurels sur le texte brut (début/fin interdits, regex)
// - découpe gloutonne : le plus long séparateur connu (ou nom de constante) gagne,
//   tout le reste s’accumule dans le littéral numérique courant
// - `-` juste après un littéral finissant par `E` = signe d’exposant (absorbé)

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use super::config::TableConstantes;
use super::erreur::{ErreurCalcul, Resultat};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tok {
    // Littéral brut (chiffres, `.`, `E`, `-` d’exposant) : validé par le canon
    Num(String),
    Const(Constante),
    Ans,
    Fonc(Fonction),

    Plus,
    Minus,
    Fois,   // ×
    Obelus, // ÷
    Slash,  // / (barre de fraction)

    Carre,    // ²
    Fact,     // !
    Pourcent, // %

    LPar,
    RPar,
    Virgule,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Constante {
    Pi,
    Euler,
    Nommee(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fonction {
    // arrière : l’opérande de gauche est la valeur juste avant `(`
    Puissance, // ^
    RacineN,   // x√
    Exposant,  // E( … )

    Racine, // √
    Log,
    Ln,

    Sin,
    Cos,
    Tan,
    Sec,
    Csc,
    Cot,

    ArcSin,
    ArcCos,
    ArcTan,
    ArcSec,
    ArcCsc,
    ArcCot,
}

impl Fonction {
    pub fn symbole(self) -> &'static str {
        match self {
            Fonction::Puissance => "^",
            Fonction::RacineN => "x√",
            Fonction::Exposant => "E",
            Fonction::Racine => "√",
            Fonction::Log => "log",
            Fonction::Ln => "ln",
            Fonction::Sin => "sin",
            Fonction::Cos => "cos",
            Fonction::Tan => "tan",
            Fonction::Sec => "sec",
            Fonction::Csc => "csc",
            Fonction::Cot => "cot",
            Fonction::ArcSin => "arcsin",
            Fonction::ArcCos => "arccos",
            Fonction::ArcTan => "arctan",
            Fonction::ArcSec => "arcsec",
            Fonction::ArcCsc => "arccsc",
            Fonction::ArcCot => "arccot",
        }
    }

    pub fn est_arriere(self) -> bool {
        matches!(
            self,
            Fonction::Puissance | Fonction::RacineN | Fonction::Exposant
        )
    }

    /// Nombres de virgules acceptés (fonctions à plusieurs arguments).
    pub fn virgules_acceptees(self) -> Option<&'static [usize]> {
        match self {
            Fonction::Log => Some(&[0, 1]),
            _ => None,
        }
    }

    pub fn est_trigo(self) -> bool {
        matches!(
            self,
            Fonction::Sin
                | Fonction::Cos
                | Fonction::Tan
                | Fonction::Sec
                | Fonction::Csc
                | Fonction::Cot
        )
    }

    pub fn est_arc_trigo(self) -> bool {
        matches!(
            self,
            Fonction::ArcSin
                | Fonction::ArcCos
                | Fonction::ArcTan
                | Fonction::ArcSec
                | Fonction::ArcCsc
                | Fonction::ArcCot
        )
    }
}

impl fmt::Display for Fonction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbole())
    }
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tok::Num(txt) => f.write_str(txt),
            Tok::Const(Constante::Pi) => f.write_str("π"),
            Tok::Const(Constante::Euler) => f.write_str("e"),
            Tok::Const(Constante::Nommee(nom)) => f.write_str(nom),
            Tok::Ans => f.write_str("Ans"),
            Tok::Fonc(fonction) => write!(f, "{fonction}"),
            Tok::Plus => f.write_str("+"),
            Tok::Minus => f.write_str("-"),
            Tok::Fois => f.write_str("×"),
            Tok::Obelus => f.write_str("÷"),
            Tok::Slash => f.write_str("/"),
            Tok::Carre => f.write_str("²"),
            Tok::Fact => f.write_str("!"),
            Tok::Pourcent => f.write_str("%"),
            Tok::LPar => f.write_str("("),
            Tok::RPar => f.write_str(")"),
            Tok::Virgule => f.write_str(","),
        }
    }
}

/* ------------------------ Table des séparateurs ------------------------ */

/// Symboles du clavier reconnus comme jetons (hors littéraux et constantes nommées).
pub const SEPARATEURS: &[&str] = &[
    "+", "-", "×", "÷", "/", "(", ")", "^", "²", "!", "%", "√", "x√", "log", "ln", "sin", "cos",
    "tan", "sec", "csc", "cot", "arcsin", "arccos", "arctan", "arcsec", "arccsc", "arccot", ",",
    "Ans", "π", "e",
];

fn jeton_separateur(sym: &str) -> Option<Tok> {
    let t = match sym {
        "+" => Tok::Plus,
        "-" => Tok::Minus,
        "×" => Tok::Fois,
        "÷" => Tok::Obelus,
        "/" => Tok::Slash,
        "(" => Tok::LPar,
        ")" => Tok::RPar,
        "²" => Tok::Carre,
        "!" => Tok::Fact,
        "%" => Tok::Pourcent,
        "," => Tok::Virgule,
        "Ans" => Tok::Ans,
        "π" => Tok::Const(Constante::Pi),
        "e" => Tok::Const(Constante::Euler),
        "^" => Tok::Fonc(Fonction::Puissance),
        "x√" => Tok::Fonc(Fonction::RacineN),
        "√" => Tok::Fonc(Fonction::Racine),
        "log" => Tok::Fonc(Fonction::Log),
        "ln" => Tok::Fonc(Fonction::Ln),
        "sin" => Tok::Fonc(Fonction::Sin),
        "cos" => Tok::Fonc(Fonction::Cos),
        "tan" => Tok::Fonc(Fonction::Tan),
        "sec" => Tok::Fonc(Fonction::Sec),
        "csc" => Tok::Fonc(Fonction::Csc),
        "cot" => Tok::Fonc(Fonction::Cot),
        "arcsin" => Tok::Fonc(Fonction::ArcSin),
        "arccos" => Tok::Fonc(Fonction::ArcCos),
        "arctan" => Tok::Fonc(Fonction::ArcTan),
        "arcsec" => Tok::Fonc(Fonction::ArcSec),
        "arccsc" => Tok::Fonc(Fonction::ArcCsc),
        "arccot" => Tok::Fonc(Fonction::ArcCot),
        _ => return None,
    };
    Some(t)
}

/// Plus long séparateur (ou nom de constante) en tête de `reste` : (longueur, jeton).
fn plus_long_separateur(reste: &str, constantes: &TableConstantes) -> Option<(usize, Tok)> {
    let mut meilleur: Option<(usize, Tok)> = None;

    for sym in SEPARATEURS {
        if reste.starts_with(sym) && meilleur.as_ref().map_or(true, |(l, _)| sym.len() > *l) {
            if let Some(t) = jeton_separateur(sym) {
                meilleur = Some((sym.len(), t));
            }
        }
    }

    for nom in constantes.noms() {
        if reste.starts_with(nom) && meilleur.as_ref().map_or(true, |(l, _)| nom.len() > *l) {
            meilleur = Some((nom.len(), Tok::Const(Constante::Nommee(nom.to_string()))));
        }
    }

    meilleur
}

/* ------------------------ Contrôles structurels ------------------------ */

const DEBUTS_INTERDITS: &[&str] = &["×", "÷", "/", ")", "^", "x√", "²", "!", "%", ","];
const FINS_INTERDITES: &[&str] = &["+", "-", "×", "÷", "/", "(", ",", "E"];

lazy_static! {
    static ref DIVISIONS_REPETEES: Regex = Regex::new(r"[×÷/]{2,}").unwrap();
    static ref SIGNE_AVANT_OPERATEUR: Regex = Regex::new(r"[+\-][×÷/!]").unwrap();
    static ref POINT_APRES_PARENTHESE: Regex = Regex::new(r"\)\.").unwrap();
    static ref OPERATEUR_AVANT_POSTFIXE: Regex = Regex::new(r"[+\-×÷(/](²|x√)").unwrap();
}

fn verifier_structure(s: &str) -> Resultat<()> {
    if let Some(d) = DEBUTS_INTERDITS.iter().find(|d| s.starts_with(**d)) {
        return Err(ErreurCalcul::syntaxe(format!(
            "La formule ne peut pas commencer par « {d} »."
        )));
    }
    if let Some(f) = FINS_INTERDITES.iter().find(|f| s.ends_with(**f)) {
        return Err(ErreurCalcul::syntaxe(format!(
            "La formule ne peut pas se terminer par « {f} »."
        )));
    }

    let regles: [(&Regex, &str); 4] = [
        (
            &DIVISIONS_REPETEES,
            "Les signes ×, ÷ et / ne peuvent pas se suivre.",
        ),
        (
            &SIGNE_AVANT_OPERATEUR,
            "Un signe + ou - ne peut pas précéder ×, ÷, / ou !.",
        ),
        (
            &POINT_APRES_PARENTHESE,
            "Un point ne peut pas suivre une parenthèse fermante.",
        ),
        (
            &OPERATEUR_AVANT_POSTFIXE,
            "² et x√ doivent suivre une valeur, pas +, -, ×, ÷, / ou (.",
        ),
    ];

    for (re, msg) in regles {
        if re.is_match(s) {
            return Err(ErreurCalcul::syntaxe(msg));
        }
    }
    Ok(())
}

/* ------------------------ Tokenisation ------------------------ */

/// Tokenize une formule clavier.
/// - espaces ignorés ; formule vide => aucun jeton
/// - séparateurs : table fixe + noms des constantes de l’appelant
/// - littéraux : texte brut (validé plus tard par le canon)
pub fn tokenize(formule: &str, constantes: &TableConstantes) -> Resultat<Vec<Tok>> {
    let s: String = formule.chars().filter(|c| !c.is_whitespace()).collect();
    if s.is_empty() {
        return Ok(Vec::new());
    }

    verifier_structure(&s)?;

    let mut out = Vec::new();
    let mut litteral = String::new();
    let mut reste = s.as_str();

    while let Some(c) = reste.chars().next() {
        // 2E-5 : le `-` appartient à l’exposant
        let signe_exposant = c == '-' && litteral.ends_with('E');

        match plus_long_separateur(reste, constantes) {
            Some((long, tok)) if !signe_exposant => {
                if !litteral.is_empty() {
                    out.push(Tok::Num(std::mem::take(&mut litteral)));
                }
                out.push(tok);
                reste = &reste[long..];
            }
            _ => {
                litteral.push(c);
                reste = &reste[c.len_utf8()..];
            }
        }
    }

    if !litteral.is_empty() {
        out.push(Tok::Num(litteral));
    }

    Ok(out)
}

/// Format utilitaire (debug/“démarche”) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Tok]) -> String {
    tokens
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
