//! Multi-voice SSML generation.
//!
//! Each non-blank line of the input becomes one `<voice>` block.  The roster
//! is shuffled once per document (Fisher–Yates via [`SliceRandom::shuffle`])
//! and line `i` is spoken by `shuffled[i % roster.len()]`.
//!
//! ```text
//! <speak xmlns=".." xmlns:mstts=".." version="1.0" xml:lang="fr-FR">
//!   <voice name="fr-FR-HenriNeural">
//!     <mstts:express-as>
//!       <prosody rate="0%" pitch="0%">line</prosody>
//!     </mstts:express-as>
//!   </voice>
//!   ...
//! </speak>
//! ```
//! (whitespace added for readability; the generated document has none)

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::speech::SpeechError;

const SSML_NS: &str = "http://www.w3.org/2001/10/synthesis";
const MSTTS_NS: &str = "http://www.w3.org/2001/mstts";

/// Generate SSML using the thread-local RNG.
pub fn generate_ssml(text: &str, locale: &str, roster: &[String]) -> Result<String, SpeechError> {
    generate_ssml_with_rng(text, locale, roster, &mut rand::thread_rng())
}

/// Generate SSML with an explicit RNG, for reproducible speaker order.
pub fn generate_ssml_with_rng<R: Rng + ?Sized>(
    text: &str,
    locale: &str,
    roster: &[String],
    rng: &mut R,
) -> Result<String, SpeechError> {
    if roster.is_empty() {
        return Err(SpeechError::EmptyRoster(locale.to_string()));
    }

    let mut speakers = roster.to_vec();
    speakers.shuffle(rng);

    let mut writer = Writer::new(Vec::new());

    let mut speak = BytesStart::new("speak");
    speak.push_attribute(("xmlns", SSML_NS));
    speak.push_attribute(("xmlns:mstts", MSTTS_NS));
    speak.push_attribute(("version", "1.0"));
    speak.push_attribute(("xml:lang", locale));
    write(&mut writer, Event::Start(speak))?;

    let lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
    for (i, line) in lines.enumerate() {
        let mut voice = BytesStart::new("voice");
        voice.push_attribute(("name", speakers[i % speakers.len()].as_str()));
        let mut prosody = BytesStart::new("prosody");
        prosody.push_attribute(("rate", "0%"));
        prosody.push_attribute(("pitch", "0%"));

        write(&mut writer, Event::Start(voice))?;
        write(&mut writer, Event::Start(BytesStart::new("mstts:express-as")))?;
        write(&mut writer, Event::Start(prosody))?;
        write(&mut writer, Event::Text(BytesText::new(line)))?;
        write(&mut writer, Event::End(BytesEnd::new("prosody")))?;
        write(&mut writer, Event::End(BytesEnd::new("mstts:express-as")))?;
        write(&mut writer, Event::End(BytesEnd::new("voice")))?;
    }

    write(&mut writer, Event::End(BytesEnd::new("speak")))?;

    String::from_utf8(writer.into_inner()).map_err(|e| SpeechError::Markup(e.to_string()))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), SpeechError> {
    writer
        .write_event(event)
        .map_err(|e| SpeechError::Markup(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn roster(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn voice_names(ssml: &str) -> Vec<String> {
        ssml.split("<voice name=\"")
            .skip(1)
            .map(|rest| rest.split('"').next().unwrap().to_string())
            .collect()
    }

    #[test]
    fn one_voice_block_per_line_drawn_from_roster() {
        let speakers = roster(&["fr-FR-HenriNeural", "fr-FR-DeniseNeural"]);
        let ssml = generate_ssml("Bonjour\nÇa va ?\nÀ demain", "fr-FR", &speakers).unwrap();

        let names = voice_names(&ssml);
        assert_eq!(names.len(), 3);
        assert!(names.iter().all(|n| speakers.contains(n)));
        assert_eq!(ssml.matches("</voice>").count(), 3);
    }

    #[test]
    fn lines_cycle_through_the_shuffled_roster() {
        let speakers = roster(&["a", "b", "c"]);
        let text = "1\n2\n3\n4\n5\n6";
        let names = voice_names(
            &generate_ssml_with_rng(text, "en-US", &speakers, &mut StdRng::seed_from_u64(7)).unwrap(),
        );

        assert_eq!(names.len(), 6);
        assert_eq!(names[0..3], names[3..6]);
        let mut first_round = names[0..3].to_vec();
        first_round.sort();
        assert_eq!(first_round, speakers);
    }

    #[test]
    fn same_seed_gives_same_document() {
        let speakers = roster(&["a", "b", "c", "d"]);
        let a = generate_ssml_with_rng("x\ny", "en-US", &speakers, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = generate_ssml_with_rng("x\ny", "en-US", &speakers, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let ssml = generate_ssml("one\n\n   \ntwo\n", "en-US", &roster(&["v"])).unwrap();
        assert_eq!(voice_names(&ssml).len(), 2);
    }

    #[test]
    fn envelope_declares_locale_and_prosody() {
        let ssml = generate_ssml("Salut", "fr-FR", &roster(&["fr-FR-YvesNeural"])).unwrap();
        assert!(ssml.starts_with(
            "<speak xmlns=\"http://www.w3.org/2001/10/synthesis\" \
             xmlns:mstts=\"http://www.w3.org/2001/mstts\" version=\"1.0\" xml:lang=\"fr-FR\">"
        ));
        assert!(ssml.contains(
            "<voice name=\"fr-FR-YvesNeural\"><mstts:express-as>\
             <prosody rate=\"0%\" pitch=\"0%\">Salut</prosody></mstts:express-as></voice>"
        ));
        assert!(ssml.ends_with("</speak>"));
    }

    #[test]
    fn text_is_escaped() {
        let ssml = generate_ssml("Tom & Jerry <3", "en-US", &roster(&["v"])).unwrap();
        assert!(ssml.contains("Tom &amp; Jerry &lt;3"));
    }

    #[test]
    fn empty_roster_is_rejected() {
        assert!(matches!(
            generate_ssml("hi", "fr-FR", &[]),
            Err(SpeechError::EmptyRoster(_))
        ));
    }
}
