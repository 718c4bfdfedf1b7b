use super::{card_image, deck_url, progress_bar, text};
use super::{DeckRecord, FetchReport, OutputCard, OutputManifest, SourceInfo, REBIRTH_DECK_GUID};
use crate::error::Result;
use crate::utils::files::{write_manifest, ProjectLayout, REBIRTH_IMAGES};
use crate::utils::guid::safe_optional_guid;
use crate::utils::http::Fetch;
use crate::utils::images::{ImageStore, WebpDetection};

pub fn rebirth_image_store(layout: &ProjectLayout) -> ImageStore {
    ImageStore::new(
        layout.public_dir(),
        REBIRTH_IMAGES,
        WebpDetection::SuffixOrCardSegment,
    )
}

fn set_order(card: &OutputCard) -> (&str, &str) {
    (
        text(&card.faction).unwrap_or_default(),
        text(&card.name).unwrap_or_default(),
    )
}

/// Order cards by faction, then name. Missing or non-string values compare as "".
pub fn sort_set(cards: &mut [OutputCard]) {
    cards.sort_by(|a, b| set_order(a).cmp(&set_order(b)));
}

/// Turn the set export into output cards, trusting the embedded card records.
pub async fn normalize_set<F: Fetch>(
    fetcher: &F,
    base: &str,
    store: &ImageStore,
    deck: DeckRecord,
    report: &mut FetchReport,
) -> Result<Vec<OutputCard>> {
    let entries = deck.entries();
    let pb = progress_bar(entries.len());
    let mut cards = Vec::with_capacity(entries.len());

    for entry in entries {
        let guid = safe_optional_guid(entry.card_guid())?;
        pb.set_message(guid.clone());

        let detail = entry.card.unwrap_or_default();
        let image = card_image(fetcher, base, store, &guid, &detail, report).await?;
        cards.push(OutputCard::from_detail(guid, detail, image));
        pb.inc(1);
    }

    pb.finish_and_clear();
    sort_set(&mut cards);
    report.cards = cards.len();
    Ok(cards)
}

/// Fetch the Rebirth set, store its artwork and write `src/data/rebirth.json`.
pub async fn fetch_rebirth<F: Fetch>(
    fetcher: &F,
    base: &str,
    layout: &ProjectLayout,
) -> Result<FetchReport> {
    let mut report = FetchReport::default();

    let url = deck_url(base, REBIRTH_DECK_GUID);
    println!("Fetching Rebirth set from {}", url);
    let deck: DeckRecord = fetcher.get_json(&url).await?;
    let deck_name = deck.name.clone();
    println!(
        "Found {} cards, downloading artwork...",
        deck.deck_cards.as_ref().map_or(0, Vec::len)
    );

    let cards = normalize_set(fetcher, base, &rebirth_image_store(layout), deck, &mut report).await?;

    let manifest = OutputManifest {
        source: SourceInfo::new(REBIRTH_DECK_GUID, deck_name, base),
        cards,
    };
    report.manifest = layout.rebirth_manifest();
    write_manifest(&report.manifest, &manifest)?;

    report.print_summary();
    println!("Wrote {} ({} cards)", report.manifest.display(), report.cards);
    Ok(report)
}
