//! Noyau — évaluation (pipeline réel)
//!
//! tokenize -> canon (jetons canoniques) -> paires -> évaluation récursive par plages
//!
//! L’évaluateur est une machine à piles par niveau de parenthèses :
//! pile de fraction (a/b, a/b/c), pile de produit, pile de somme.
//! Le drapeau `exact` vit dans l’évaluateur (un par appel) : dès qu’une étape sort de
//! la borne rationnelle ou paraît irrationnelle, tout le reste du calcul est décimal.

use std::mem::take;

use num_rational::BigRational;
use tracing::{debug, trace};

use super::canon::Canoniseur;
use super::config::{Config, TableConstantes};
use super::decimal::{decomposer_litteral, Decimal};
use super::erreur::{division_par_zero, trop_grand, ErreurCalcul, Resultat};
use super::format::{format_litteral, format_nombre};
use super::jetons::{format_tokens, tokenize, Constante, Fonction, Tok};
use super::nombre::{
    dans_bornes, depasse_maximum, rationnel_litteral, test_rationalite, Nombre, MAX_EXP,
};
use super::paires::{decouper_virgules, Paires};
use super::transcendant::{euler, pi};

#[derive(Default, Clone, Debug)]
pub struct DemarcheNoyau {
    pub jetons: String,
    pub canon: String,
    /// Le résultat est-il resté exact (rationnel borné) ?
    pub exact: bool,
    pub preuve: String,
    pub note: String,
}

#[derive(Clone, Debug)]
pub struct Evaluation {
    pub valeur: Nombre,
    /// Rendu selon le style de fraction configuré.
    pub affichage: String,
    pub demarche: DemarcheNoyau,
}

/// API publique : évalue une formule clavier.
pub fn evaluate_formula(formule: &str, config: &Config) -> Resultat<Nombre> {
    executer(formule, config).map(|(valeur, _)| valeur)
}

/// API publique : valeur + affichage + démarche (jetons, canon, exactitude, preuve).
pub fn eval_expression(formule: &str, config: &Config) -> Resultat<Evaluation> {
    let (valeur, demarche) = executer(formule, config)?;
    let affichage = format_nombre(&valeur, config.reglages.style_fraction);
    Ok(Evaluation {
        valeur,
        affichage,
        demarche,
    })
}

fn executer(formule: &str, config: &Config) -> Resultat<(Nombre, DemarcheNoyau)> {
    debug!(formule, "évaluation");

    // 1) Jetons
    let jetons = tokenize(formule, &config.constantes)?;
    trace!(jetons = %format_tokens(&jetons), "jetons");

    // 2) Canon (Ans = littéral de la réponse précédente, sans constantes nommées)
    let reponse = tokenize(&format_litteral(&config.reponse), &TableConstantes::default())?;
    let canon = Canoniseur::new(&reponse).normaliser(&jetons, false, None)?;
    trace!(canon = %format_tokens(&canon), "canon");

    // 3) Évaluation
    let mut ev = Evaluateur::new(&canon, config)?;
    let valeur = ev.evaluer()?;
    debug!(exact = ev.exact, "résultat");

    let demarche = DemarcheNoyau {
        jetons: format_tokens(&jetons),
        canon: format_tokens(&canon),
        exact: valeur.est_exact(),
        preuve: ev.preuve.join("\n"),
        note: "Pipeline: jetons → canon → paires → piles (fraction, produit, somme) → test de rationalité.".into(),
    };
    Ok((valeur, demarche))
}

/* ------------------------ Évaluateur ------------------------ */

pub(super) struct Evaluateur<'a> {
    pub(super) jetons: &'a [Tok],
    pub(super) paires: Paires,
    pub(super) config: &'a Config,
    /// Drapeau d’exactitude (jamais global).
    pub(super) exact: bool,
    /// Angles remarquables reconnus (démarche).
    pub(super) preuve: Vec<String>,
}

/// État d’un niveau de parenthèses.
struct Cadre {
    somme: Vec<Nombre>,
    produit: Vec<Nombre>,
    fraction: Vec<Nombre>,
    dernier: Option<Nombre>,
    fonction: Option<Fonction>,
    /// prochain terme soustrait
    soustraction: bool,
    /// prochain facteur divisé
    division: bool,
    /// signe en attente pour la prochaine opérande
    negatif: bool,
    /// un opérateur vient d’être vu (le signe suivant est collant)
    collant: bool,
}

impl Cadre {
    fn new() -> Self {
        Self {
            somme: Vec::new(),
            produit: Vec::new(),
            fraction: Vec::new(),
            dernier: None,
            fonction: None,
            soustraction: false,
            division: false,
            negatif: false,
            collant: true,
        }
    }

    /// Pose une opérande en appliquant le signe en attente.
    fn poser(&mut self, v: Nombre) {
        let v = if self.negatif { -v } else { v };
        self.negatif = false;
        self.dernier = Some(v);
        self.collant = false;
    }

    fn prendre_dernier(&mut self) -> Resultat<Nombre> {
        self.dernier
            .take()
            .ok_or_else(|| ErreurCalcul::interne("eval : opérande manquante"))
    }
}

impl<'a> Evaluateur<'a> {
    pub(super) fn new(jetons: &'a [Tok], config: &'a Config) -> Resultat<Self> {
        let paires = match Paires::apparier(jetons) {
            Ok((p, 0)) => p,
            _ => return Err(ErreurCalcul::interne("eval : parenthèses non appariées")),
        };
        Ok(Self {
            jetons,
            paires,
            config,
            exact: true,
            preuve: Vec::new(),
        })
    }

    pub(super) fn evaluer(&mut self) -> Resultat<Nombre> {
        let v = self.evaluer_plage(0, self.jetons.len())?;
        Ok(self.ajuster(v))
    }

    /* ------------------------ Exactitude ------------------------ */

    pub(super) fn degrader(&mut self, raison: &str) {
        if self.exact {
            debug!(raison, "passage au calcul décimal");
            self.exact = false;
        }
    }

    /// Remet une valeur en accord avec le drapeau (borne rationnelle incluse).
    pub(super) fn ajuster(&mut self, v: Nombre) -> Nombre {
        match v {
            Nombre::Exact(q) if self.exact && dans_bornes(&q) => Nombre::Exact(q),
            Nombre::Exact(q) => {
                self.degrader("rationnel hors borne");
                Nombre::Approx(Decimal::depuis_rationnel(&q))
            }
            Nombre::Approx(d) => {
                self.degrader("valeur décimale");
                Nombre::Approx(d)
            }
        }
    }

    /// Sortie décimale d’une fonction : test de rationalité tant que le calcul est exact.
    pub(super) fn issue_fonction(&mut self, d: Decimal, nom: &str) -> Nombre {
        if !self.exact {
            return Nombre::Approx(d);
        }
        match test_rationalite(&d) {
            Some(q) => Nombre::Exact(q),
            None => {
                debug!(fonction = nom, "résultat irrationnel");
                self.degrader("résultat de fonction irrationnel");
                Nombre::Approx(d)
            }
        }
    }

    /// Sortie rationnelle exacte d’une fonction (angle remarquable, racine parfaite…).
    pub(super) fn issue_exacte(&mut self, q: BigRational) -> Nombre {
        if self.exact {
            self.ajuster(Nombre::Exact(q))
        } else {
            Nombre::Approx(Decimal::depuis_rationnel(&q))
        }
    }

    /* ------------------------ Arithmétique ------------------------ */

    pub(super) fn ajouter(&mut self, a: Nombre, b: Nombre) -> Resultat<Nombre> {
        let v = match (a, b) {
            (Nombre::Exact(x), Nombre::Exact(y)) if self.exact => Nombre::Exact(x + y),
            (a, b) => {
                let d = a.vers_decimal().ajouter(&b.vers_decimal());
                if depasse_maximum(&d) {
                    return Err(trop_grand());
                }
                Nombre::Approx(d)
            }
        };
        Ok(self.ajuster(v))
    }

    pub(super) fn multiplier(&mut self, a: Nombre, b: Nombre) -> Resultat<Nombre> {
        let v = match (a, b) {
            (Nombre::Exact(x), Nombre::Exact(y)) if self.exact => Nombre::Exact(x * y),
            (a, b) => {
                let d = a.vers_decimal().multiplier(&b.vers_decimal());
                if depasse_maximum(&d) {
                    return Err(trop_grand());
                }
                Nombre::Approx(d)
            }
        };
        Ok(self.ajuster(v))
    }

    pub(super) fn diviser(&mut self, a: Nombre, b: Nombre) -> Resultat<Nombre> {
        if b.est_zero() {
            return Err(division_par_zero());
        }
        let v = match (a, b) {
            (Nombre::Exact(x), Nombre::Exact(y)) if self.exact => Nombre::Exact(x / y),
            (a, b) => {
                let d = a
                    .vers_decimal()
                    .diviser(&b.vers_decimal())
                    .ok_or_else(division_par_zero)?;
                if depasse_maximum(&d) {
                    return Err(trop_grand());
                }
                Nombre::Approx(d)
            }
        };
        Ok(self.ajuster(v))
    }

    fn inverser(&mut self, v: Nombre) -> Resultat<Nombre> {
        self.diviser(Nombre::entier(1), v)
    }

    /* ------------------------ Opérandes ------------------------ */

    fn lire_nombre(&mut self, txt: &str) -> Resultat<Nombre> {
        let (m, e) = decomposer_litteral(txt).ok_or_else(|| {
            ErreurCalcul::interne(format!("eval : littéral non canonique « {txt} »"))
        })?;

        let d = Decimal::new(m.clone(), e);
        if depasse_maximum(&d) {
            return Err(trop_grand());
        }
        // 1E-9223372036854775808 : s’écrase sur zéro
        if d.exposant10() < -2 * MAX_EXP {
            self.degrader("littéral sous le plancher");
            return Ok(Nombre::Approx(Decimal::zero()));
        }

        if self.exact {
            if let Some(q) = rationnel_litteral(&m, e) {
                return Ok(Nombre::Exact(q));
            }
            self.degrader("littéral hors borne");
        }
        Ok(Nombre::Approx(d))
    }

    fn lire_constante(&mut self, c: &Constante) -> Resultat<Nombre> {
        let d = match c {
            Constante::Pi => pi(),
            Constante::Euler => euler(),
            Constante::Nommee(nom) => self
                .config
                .constantes
                .valeur(nom)
                .cloned()
                .ok_or_else(|| ErreurCalcul::interne(format!("eval : constante inconnue « {nom} »")))?,
        };
        self.degrader("constante");
        Ok(Nombre::Approx(d))
    }

    /* ------------------------ Réductions ------------------------ */

    /// Vide la pile de fraction : n/d ou w + n/d.
    fn reduire_fraction(&mut self, c: &mut Cadre) -> Resultat<Nombre> {
        let v = c.prendre_dernier()?;
        if c.fraction.is_empty() {
            return Ok(v);
        }
        c.fraction.push(v);

        let mut pile = take(&mut c.fraction).into_iter();
        match (pile.next(), pile.next(), pile.next(), pile.next()) {
            (Some(n), Some(d), None, None) => self.diviser(n, d),
            (Some(w), Some(n), Some(d), None) => {
                let f = self.diviser(n, d)?;
                self.ajouter(w, f)
            }
            _ => Err(ErreurCalcul::interne("eval : pile de fraction invalide")),
        }
    }

    /// Vide fraction puis produit.
    fn reduire_produit(&mut self, c: &mut Cadre) -> Resultat<Nombre> {
        let v = self.reduire_fraction(c)?;
        if c.produit.is_empty() {
            return Ok(v);
        }
        let v = if c.division { self.inverser(v)? } else { v };
        c.division = false;

        let mut acc = v;
        for f in take(&mut c.produit) {
            acc = self.multiplier(f, acc)?;
        }
        Ok(acc)
    }

    fn terminer(&mut self, mut c: Cadre) -> Resultat<Nombre> {
        if c.fonction.is_some() {
            return Err(ErreurCalcul::interne("eval : fonction sans argument"));
        }
        let v = self.reduire_produit(&mut c)?;
        if c.somme.is_empty() {
            return Ok(v);
        }
        let v = if c.soustraction { -v } else { v };

        let mut acc = v;
        for t in take(&mut c.somme) {
            acc = self.ajouter(t, acc)?;
        }
        Ok(acc)
    }

    /* ------------------------ Boucle principale ------------------------ */

    /// Évalue jetons[debut..fin] (un niveau), récursivement pour les groupes.
    pub(super) fn evaluer_plage(&mut self, debut: usize, fin: usize) -> Resultat<Nombre> {
        if debut == fin {
            return Ok(Nombre::zero());
        }

        let jetons = self.jetons;
        let mut c = Cadre::new();
        let mut i = debut;

        while i < fin {
            match &jetons[i] {
                Tok::Num(txt) => {
                    let v = self.lire_nombre(txt)?;
                    c.poser(v);
                }

                Tok::Const(k) => {
                    let v = self.lire_constante(k)?;
                    c.poser(v);
                }

                Tok::Plus | Tok::Minus => {
                    let moins = jetons[i] == Tok::Minus;
                    if c.collant || c.dernier.is_none() {
                        // signe collant : s’applique à la prochaine opérande
                        c.negatif = moins;
                    } else {
                        let v = self.reduire_produit(&mut c)?;
                        let v = if c.soustraction { -v } else { v };
                        c.somme.push(v);
                        c.soustraction = moins;
                    }
                    c.collant = false;
                }

                Tok::Fois | Tok::Obelus => {
                    let v = self.reduire_fraction(&mut c)?;
                    let v = if c.division { self.inverser(v)? } else { v };
                    c.produit.push(v);
                    c.division = jetons[i] == Tok::Obelus;
                    c.negatif = false;
                    c.collant = true;
                }

                Tok::Slash => {
                    // (1)/(2)/(3)/(4) : un groupe relance l’îlot, a/b/c est replié d’abord
                    let v = if c.fraction.len() == 2 {
                        self.reduire_fraction(&mut c)?
                    } else {
                        c.prendre_dernier()?
                    };
                    c.fraction.push(v);
                    c.collant = true;
                }

                Tok::Carre => {
                    let v = c.prendre_dernier()?;
                    c.dernier = Some(self.carre(v)?);
                }

                Tok::Fact => {
                    let v = c.prendre_dernier()?;
                    c.dernier = Some(self.factorielle(v)?);
                }

                Tok::Fonc(f) => c.fonction = Some(*f),

                Tok::LPar => {
                    let fermante = self
                        .paires
                        .fermante(i)
                        .filter(|&p| p < fin)
                        .ok_or_else(|| ErreurCalcul::interne("eval : paire de parenthèses absente"))?;

                    match c.fonction.take() {
                        Some(f) if f.est_arriere() => {
                            // ^, x√, E : l’opérande de gauche, déjà signée
                            let gauche = c.prendre_dernier()?;
                            let droite = self.evaluer_plage(i + 1, fermante)?;
                            c.dernier = Some(self.appliquer_arriere(f, gauche, droite)?);
                            c.collant = false;
                        }
                        Some(f) if f.virgules_acceptees().is_some() => {
                            let parties = decouper_virgules(jetons, i + 1, fermante);
                            let v = if parties.len() > 1 {
                                let mut args = Vec::with_capacity(parties.len());
                                for (a, b) in parties {
                                    args.push(self.evaluer_plage(a, b)?);
                                }
                                self.appliquer_virgules(f, args)?
                            } else {
                                let x = self.evaluer_plage(i + 1, fermante)?;
                                self.appliquer(f, x)?
                            };
                            c.poser(v);
                        }
                        Some(f) => {
                            let x = self.evaluer_plage(i + 1, fermante)?;
                            let v = self.appliquer(f, x)?;
                            c.poser(v);
                        }
                        None => {
                            let v = self.evaluer_plage(i + 1, fermante)?;
                            c.poser(v);
                        }
                    }
                    i = fermante;
                }

                Tok::RPar => {
                    return Err(ErreurCalcul::interne("eval : fermante hors paire"));
                }

                Tok::Ans | Tok::Pourcent | Tok::Virgule => {
                    return Err(ErreurCalcul::interne(format!(
                        "eval : jeton non canonique « {} »",
                        jetons[i]
                    )));
                }
            }
            i += 1;
        }

        self.terminer(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::config::{Reglages, StyleFraction};

    fn eval(s: &str) -> Nombre {
        evaluate_formula(s, &Config::default()).unwrap()
    }

    fn exact(s: &str) -> BigRational {
        match eval(s) {
            Nombre::Exact(q) => q,
            autre => panic!("{s} : attendu exact, obtenu {autre:?}"),
        }
    }

    fn q(n: i64, d: i64) -> BigRational {
        BigRational::new(n.into(), d.into())
    }

    #[test]
    fn priorites_usuelles() {
        assert_eq!(exact("2+3×4"), q(14, 1));
        assert_eq!(exact("2×3+4"), q(10, 1));
        assert_eq!(exact("10-4-3"), q(3, 1));
        assert_eq!(exact("12÷3÷2"), q(2, 1));
        assert_eq!(exact("2-3×4+1"), q(-9, 1));
        assert_eq!(exact("8÷2×4"), q(16, 1));
    }

    #[test]
    fn signes_en_attente() {
        assert_eq!(exact("-2+3"), q(1, 1));
        assert_eq!(exact("2×-3"), q(-6, 1));
        assert_eq!(exact("-(2+3)"), q(-5, 1));
        assert_eq!(exact("-√(4)"), q(-2, 1));
        assert_eq!(exact("1/-2"), q(-1, 2));
        assert_eq!(exact("3--2"), q(5, 1));
        assert_eq!(exact("-2^(2)"), q(4, 1));
    }

    #[test]
    fn fractions_et_mixtes() {
        assert_eq!(exact("1/2"), q(1, 2));
        assert_eq!(exact("1/2/3"), q(5, 3));
        assert_eq!(exact("1/2+1/3"), q(5, 6));
        assert_eq!(exact("2×1/4"), q(1, 2));
    }

    #[test]
    fn vide_vaut_zero() {
        assert_eq!(exact(""), q(0, 1));
        assert_eq!(exact("0"), q(0, 1));
    }

    #[test]
    fn reponse_precedente() {
        let config = Config {
            reponse: Nombre::fraction(-7, 2),
            ..Config::default()
        };
        assert_eq!(evaluate_formula("2Ans", &config), Ok(Nombre::entier(-7)));
        assert_eq!(evaluate_formula("Ans²", &config), Ok(Nombre::fraction(49, 4)));
    }

    #[test]
    fn reponse_decimale_relue_sans_perte() {
        let approx = evaluate_formula("√(2)", &Config::default()).unwrap();
        let config = Config {
            reponse: approx.clone(),
            ..Config::default()
        };
        assert_eq!(evaluate_formula("Ans", &config), Ok(approx));
    }

    #[test]
    fn demarche_et_affichage() {
        let config = Config::avec_reglages(Reglages {
            style_fraction: StyleFraction::Mixte,
            ..Reglages::default()
        });
        let e = eval_expression("7÷2", &config).unwrap();
        assert_eq!(e.affichage, "3/1/2");
        assert_eq!(e.demarche.jetons, "7 ÷ 2");
        assert!(e.demarche.exact);

        let e = eval_expression("sin(30)+2(1", &Config::default()).unwrap();
        assert_eq!(e.demarche.canon, "sin ( 30 ) + 2 × ( 1 )");
        assert_eq!(e.demarche.preuve, "sin(30°) = 1/2");
        assert_eq!(e.affichage, "5/2");
    }

    #[test]
    fn exactitude_perdue_pour_tout_le_calcul() {
        // π/π = 1 mais le calcul est passé en décimal
        assert!(matches!(eval("π÷π"), Nombre::Approx(_)));
        assert!(matches!(eval("2147483648+1"), Nombre::Approx(_)));
        assert!(matches!(eval("1/3"), Nombre::Exact(_)));
    }
}
