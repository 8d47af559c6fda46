// src/noyau/canon.rs
//
// Canonicalisation de la séquence de jetons (déterministe, par niveau) :
// - parenthèses appariées, `(` non fermées complétées en fin de séquence
// - multiplication implicite (2(3), 2π, (1)(2), 3²4 …)
// - validation des littéraux (un seul `.`, un seul `E`, `.` avant `E`)
// - % → ÷ 100
// - au plus deux `/` par îlot (a/b, a/b/c)
// - fonctions à virgules : découpe sur les virgules de niveau 0, arité contrôlée
// - suites de signes repliées en un seul (nombre impair de `-` → `-`)
// - Ans → ( littéral de la réponse précédente )
// - marqueur d’exposant : 2E(3) → 2 E( 3 )
//
// À la sortie, l’évaluateur ne rencontre jamais de séquence mal formée.

use std::iter::repeat;

use tracing::trace;

use super::decimal::decomposer_litteral;
use super::erreur::{ErreurCalcul, Resultat};
use super::jetons::{Fonction, Tok};
use super::paires::{decouper_virgules, Paires};

/// Au plus a/b/c dans un îlot.
const MAX_BARRES: usize = 2;

pub struct Canoniseur<'a> {
    /// Jetons du littéral de la réponse précédente (substitués à Ans).
    reponse: &'a [Tok],
}

impl<'a> Canoniseur<'a> {
    pub fn new(reponse: &'a [Tok]) -> Self {
        Self { reponse }
    }

    /// Normalise un niveau (et récursivement chaque groupe parenthésé).
    ///
    /// - `recursif` : appelé sur le contenu d’un groupe (vide interdit)
    /// - `fonction` : fonction qui précède le groupe, pour les messages
    pub fn normaliser(
        &self,
        jetons: &[Tok],
        recursif: bool,
        fonction: Option<Fonction>,
    ) -> Resultat<Vec<Tok>> {
        // 1) vide
        if jetons.is_empty() {
            if !recursif {
                return Ok(Vec::new());
            }
            let msg = match fonction {
                Some(f) => format!("Parenthèses vides après « {f} »."),
                None => "Parenthèses vides détectées.".to_string(),
            };
            return Err(ErreurCalcul::syntaxe(msg));
        }

        // 2) appariement + fermeture automatique
        let (paires, manquantes) = Paires::apparier(jetons)
            .map_err(|_| ErreurCalcul::syntaxe("Parenthèses non appariées."))?;
        let mut jetons = jetons.to_vec();
        if manquantes > 0 {
            trace!(manquantes, "fermeture automatique des parenthèses");
            jetons.extend(repeat(Tok::RPar).take(manquantes));
        }

        let mut sortie = Vec::with_capacity(jetons.len() + 4);

        // suite de signes en cours
        let mut signes = 0usize;
        let mut moins = 0usize;
        // barres `/` dans l’îlot courant
        let mut barres = 0usize;
        // dernier jeton brut vu (pour × implicite et opérandes requises)
        let mut precedent: Option<Tok> = None;
        let mut en_attente: Option<Fonction> = None;

        let mut i = 0;
        while i < jetons.len() {
            let tok = &jetons[i];

            // 9) les signes s’accumulent
            if matches!(tok, Tok::Plus | Tok::Minus) {
                signes += 1;
                if *tok == Tok::Minus {
                    moins += 1;
                }
                barres = 0;
                precedent = Some(tok.clone());
                i += 1;
                continue;
            }
            if signes > 0 {
                sortie.push(if moins % 2 == 1 { Tok::Minus } else { Tok::Plus });
                signes = 0;
                moins = 0;
            }

            // 3) multiplication implicite
            if complete_operande(precedent.as_ref()) && colle_a_gauche(tok) {
                sortie.push(Tok::Fois);
                barres = 0;
            }

            match tok {
                Tok::Num(txt) => {
                    // 4) littéral
                    if let Some(base) = txt.strip_suffix('E') {
                        // marqueur d’exposant : 2E(…)
                        if jetons.get(i + 1) != Some(&Tok::LPar) {
                            return Err(ErreurCalcul::syntaxe(format!(
                                "Exposant incomplet dans « {txt} »."
                            )));
                        }
                        if !base.is_empty() {
                            valider_litteral(base)?;
                        }
                        let base = if base.is_empty() { "1" } else { base };
                        sortie.push(Tok::Num(base.to_string()));
                        sortie.push(Tok::Fonc(Fonction::Exposant));
                        en_attente = Some(Fonction::Exposant);
                        precedent = Some(Tok::Fonc(Fonction::Exposant));
                        i += 1;
                        continue;
                    }
                    valider_litteral(txt)?;
                    sortie.push(tok.clone());
                }

                Tok::Pourcent => {
                    // 5) % → ÷ 100
                    exiger_operande(precedent.as_ref(), tok)?;
                    sortie.push(Tok::Obelus);
                    sortie.push(Tok::Num("100".to_string()));
                    barres = 0;
                }

                Tok::Slash => {
                    // 6) îlot de fraction
                    exiger_operande(precedent.as_ref(), tok)?;
                    barres += 1;
                    if barres > MAX_BARRES {
                        return Err(ErreurCalcul::syntaxe(
                            "Au plus deux barres de fraction « / » par terme (a/b ou a/b/c).",
                        ));
                    }
                    sortie.push(Tok::Slash);
                }

                Tok::Fois | Tok::Obelus => {
                    exiger_operande(precedent.as_ref(), tok)?;
                    barres = 0;
                    sortie.push(tok.clone());
                }

                Tok::Carre | Tok::Fact => {
                    exiger_operande(precedent.as_ref(), tok)?;
                    sortie.push(tok.clone());
                }

                Tok::Fonc(f) => {
                    if f.est_arriere() {
                        exiger_operande(precedent.as_ref(), tok)?;
                    }
                    if jetons.get(i + 1) != Some(&Tok::LPar) {
                        return Err(ErreurCalcul::syntaxe(format!(
                            "« {f} » doit être suivi d’une parenthèse ouvrante."
                        )));
                    }
                    en_attente = Some(*f);
                    sortie.push(tok.clone());
                }

                Tok::LPar => {
                    let fermante = paires.fermante(i).ok_or_else(|| {
                        ErreurCalcul::interne("canon : parenthèse sans fermante")
                    })?;
                    let interieur = &jetons[i + 1..fermante];
                    let f = en_attente.take();

                    sortie.push(Tok::LPar);
                    match f.and_then(|f| f.virgules_acceptees().map(|a| (f, a))) {
                        // 7) fonction à virgules
                        Some((f, acceptees)) => {
                            let parties = decouper_virgules(interieur, 0, interieur.len());
                            let virgules = parties.len() - 1;
                            if !acceptees.contains(&virgules) {
                                return Err(ErreurCalcul::syntaxe(format!(
                                    "{f} doit recevoir {} virgule(s).",
                                    enumerer(acceptees)
                                )));
                            }
                            for (k, (a, b)) in parties.iter().enumerate() {
                                if k > 0 {
                                    sortie.push(Tok::Virgule);
                                }
                                sortie.extend(self.normaliser(&interieur[*a..*b], true, Some(f))?);
                            }
                        }
                        None => sortie.extend(self.normaliser(interieur, true, f)?),
                    }
                    sortie.push(Tok::RPar);

                    // 2) barre d’îlot remise à zéro par la frontière de groupe
                    barres = 0;
                    precedent = Some(Tok::RPar);
                    i = fermante + 1;
                    continue;
                }

                Tok::RPar => {
                    return Err(ErreurCalcul::interne("canon : fermante hors paire"));
                }

                // 8) virgule hors découpe de fonction
                Tok::Virgule => {
                    return Err(ErreurCalcul::syntaxe(
                        "Virgule inattendue hors des arguments d’une fonction.",
                    ));
                }

                // 10) Ans
                Tok::Ans => {
                    sortie.push(Tok::LPar);
                    sortie.extend(self.normaliser(self.reponse, true, None)?);
                    sortie.push(Tok::RPar);
                }

                Tok::Const(_) => sortie.push(tok.clone()),

                Tok::Plus | Tok::Minus => {}
            }

            precedent = Some(tok.clone());
            i += 1;
        }

        // fin du niveau : doit finir sur une opérande complète
        if signes > 0 || !complete_operande(precedent.as_ref()) {
            let dernier = precedent.map(|t| t.to_string()).unwrap_or_default();
            return Err(ErreurCalcul::syntaxe(format!(
                "Opération incomplète à « {dernier} »."
            )));
        }

        trace!(canon = %super::jetons::format_tokens(&sortie), "niveau normalisé");
        Ok(sortie)
    }
}

/* ------------------------ Règles locales ------------------------ */

/// Le jeton termine-t-il une opérande ?
fn complete_operande(t: Option<&Tok>) -> bool {
    match t {
        Some(Tok::Num(txt)) => !txt.ends_with('E'),
        Some(
            Tok::RPar | Tok::Const(_) | Tok::Ans | Tok::Carre | Tok::Fact | Tok::Pourcent,
        ) => true,
        _ => false,
    }
}

/// Le jeton commence-t-il une opérande collée à gauche (× implicite) ?
fn colle_a_gauche(t: &Tok) -> bool {
    match t {
        Tok::Fonc(f) => !f.est_arriere(),
        Tok::LPar | Tok::Ans | Tok::Const(_) | Tok::Num(_) => true,
        _ => false,
    }
}

fn exiger_operande(precedent: Option<&Tok>, tok: &Tok) -> Resultat<()> {
    if complete_operande(precedent) {
        Ok(())
    } else {
        Err(ErreurCalcul::syntaxe(format!(
            "Opération incomplète à « {tok} »."
        )))
    }
}

/// Un seul `.`, un seul `E`, `.` avant `E`, chiffres présents.
fn valider_litteral(txt: &str) -> Resultat<()> {
    if txt.matches('.').count() > 1 {
        return Err(ErreurCalcul::syntaxe(format!(
            "Le nombre « {txt} » contient plusieurs points."
        )));
    }
    if txt.matches('E').count() > 1 {
        return Err(ErreurCalcul::syntaxe(format!(
            "Le nombre « {txt} » contient plusieurs E."
        )));
    }
    if let (Some(p), Some(e)) = (txt.find('.'), txt.find('E')) {
        if p > e {
            return Err(ErreurCalcul::syntaxe(format!(
                "Le point doit précéder le E dans « {txt} »."
            )));
        }
    }
    if decomposer_litteral(txt).is_none() {
        return Err(ErreurCalcul::syntaxe(format!("Nombre invalide : « {txt} ».")));
    }
    Ok(())
}

/// [0, 1] → "0 ou 1" ; [0, 1, 2] → "0, 1 ou 2".
fn enumerer(valeurs: &[usize]) -> String {
    match valeurs {
        [] => String::new(),
        [v] => v.to_string(),
        [tete @ .., dernier] => {
            let tete: Vec<String> = tete.iter().map(|v| v.to_string()).collect();
            format!("{} ou {dernier}", tete.join(", "))
        }
    }
}
