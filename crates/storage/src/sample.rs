//! Built-in bird-song corpus used when no corpus file is configured.

use flip_core::model::{Corpus, CorpusError, QuestionRecord, TagName};

const BIRD_SONGS: [(&str, &str, &[&str]); 10] = [
    ("Merel", "Tuututuu tudu tuu", &["veelvoorkomend"]),
    ("Roodborst", "Tiitidi tudiiti ti", &["klein"]),
    ("Koolmees", "Tii duu tii duu", &["klein", "mees", "veelvoorkomend"]),
    ("Pimpelmees", "Ti ti ti dududududu", &["klein", "mees"]),
    ("Houtduif", "Tu duuu du tudu", &["duif", "veelvoorkomend"]),
    ("Tortelduif", "Tu duuu du", &["duif"]),
    ("Scholekster", "Tepiet tepiet", &["steltloper", "veelvoorkomend"]),
    ("Grutto", "Grutto grutto", &["steltloper"]),
    ("Ijsvogel", "Twiit twiit", &["blauw"]),
    ("Tapuit", "Tju tju tju", &[]),
];

/// Ten common Dutch birds, asked by song.
///
/// # Errors
///
/// Returns `CorpusError` if the built-in table is inconsistent.
pub fn bird_songs() -> Result<Corpus, CorpusError> {
    let questions = BIRD_SONGS
        .iter()
        .map(|(bird, song, tags)| {
            QuestionRecord::new(
                format!("Welke vogel zingt als de {bird}?"),
                *song,
                tags.iter().filter_map(|tag| TagName::new(*tag).ok()),
            )
        })
        .collect();
    let answers = BIRD_SONGS
        .iter()
        .map(|(bird, _, _)| (*bird).to_owned())
        .collect();

    Corpus::new(questions, answers)
}
