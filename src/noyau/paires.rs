// src/noyau/paires.rs
//
// Index des paires de parenthèses
// -------------------------------
// Appariement par pile : position de `(` → position de `)`.
// Les `(` restées ouvertes sont fermées virtuellement après la fin de la séquence
// (positions len, len+1, …), la plus interne d’abord.

use super::jetons::Tok;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Paires {
    fermantes: Vec<Option<usize>>,
}

impl Paires {
    /// Apparie les parenthèses de `jetons`.
    ///
    /// Ok((paires, n)) : n parenthèses ouvertes restent à fermer en fin de séquence.
    /// Err(pos) : `)` sans `(` correspondante à la position `pos`.
    pub fn apparier(jetons: &[Tok]) -> Result<(Paires, usize), usize> {
        let mut fermantes = vec![None; jetons.len()];
        let mut pile: Vec<usize> = Vec::new();

        for (i, t) in jetons.iter().enumerate() {
            match t {
                Tok::LPar => pile.push(i),
                Tok::RPar => {
                    let ouvrante = pile.pop().ok_or(i)?;
                    fermantes[ouvrante] = Some(i);
                }
                _ => {}
            }
        }

        let manquantes = pile.len();
        let mut fin = jetons.len();
        while let Some(ouvrante) = pile.pop() {
            fermantes[ouvrante] = Some(fin);
            fin += 1;
        }

        Ok((Paires { fermantes }, manquantes))
    }

    /// Position de la `)` associée à la `(` en `ouvrante`.
    pub fn fermante(&self, ouvrante: usize) -> Option<usize> {
        self.fermantes.get(ouvrante).copied().flatten()
    }
}

/// Découpe `jetons[debut..fin]` sur les virgules de niveau 0 : plages (debut, fin).
pub fn decouper_virgules(jetons: &[Tok], debut: usize, fin: usize) -> Vec<(usize, usize)> {
    let mut parties = Vec::new();
    let mut profondeur = 0usize;
    let mut depart = debut;

    for (i, t) in jetons.iter().enumerate().take(fin).skip(debut) {
        match t {
            Tok::LPar => profondeur += 1,
            Tok::RPar => profondeur = profondeur.saturating_sub(1),
            Tok::Virgule if profondeur == 0 => {
                parties.push((depart, i));
                depart = i + 1;
            }
            _ => {}
        }
    }

    parties.push((depart, fin));
    parties
}
