//! Shared fixtures for the GSP integration tests and benches.

use gsp_decoder::{DecoderConfig, StreamDecoder};
use gsp_encoder::GspEncoder;
use gsp_types::{ResultState, Update};

/// A well-formed transcript shaped like a real module generation.
#[must_use]
pub fn module_transcript() -> String {
    GspEncoder::new()
        .plan([
            "1. Choose the module name DisplayBestSellers",
            "2. Check the PrestaShop 8 hook documentation",
            "3. Write the main module class",
            "4. Write config.xml",
        ])
        .add_artifact(
            "DisplayBestSellers/DisplayBestSellers.php",
            "<?php\nif (!defined('_PS_VERSION_')) {\n    exit;\n}\n\nclass DisplayBestSellers extends Module\n{\n    public function install()\n    {\n        return parent::install() && $this->registerHook('displayHome');\n    }\n}",
        )
        .add_artifact(
            "DisplayBestSellers/config.xml",
            "<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n<module>\n    <name>DisplayBestSellers</name>\n</module>",
        )
        .success("Module generation is complete.")
        .encode()
        .expect("fixture transcript is well-formed")
}

/// Split `text` at the given byte offsets, moving each offset down to the
/// nearest character boundary. Offsets may be unsorted or out of range.
#[must_use]
pub fn split_at_offsets<'a>(text: &'a str, offsets: &[usize]) -> Vec<&'a str> {
    let mut cuts: Vec<usize> = offsets
        .iter()
        .map(|&offset| {
            let mut cut = offset.min(text.len());
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            cut
        })
        .collect();
    cuts.sort_unstable();

    let mut fragments = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for cut in cuts {
        fragments.push(&text[start..cut]);
        start = cut;
    }
    fragments.push(&text[start..]);
    fragments
}

/// Split `text` into fragments of one character each.
#[must_use]
pub fn char_fragments(text: &str) -> Vec<&str> {
    text.char_indices()
        .map(|(i, ch)| &text[i..i + ch.len_utf8()])
        .collect()
}

/// Feed every fragment to a fresh decoder and collect the updates.
#[must_use]
pub fn decode_all(fragments: &[&str]) -> Vec<Update> {
    let mut decoder = StreamDecoder::with_config(DecoderConfig::default());
    fragments.iter().flat_map(|f| decoder.feed(f)).collect()
}

/// Feed every fragment to a fresh decoder and merge the updates.
#[must_use]
pub fn decode_to_state(fragments: &[&str]) -> ResultState {
    ResultState::from_updates(decode_all(fragments))
}
