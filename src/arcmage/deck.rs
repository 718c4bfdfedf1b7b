use super::{card_image, card_url, deck_url, progress_bar, text};
use super::{CardDetail, DeckRecord, FetchReport, OutputCard, OutputManifest, SourceInfo};
use crate::error::Result;
use crate::utils::files::{write_manifest, ProjectLayout, DECK_IMAGES};
use crate::utils::guid::{safe_guid, safe_optional_guid};
use crate::utils::http::Fetch;
use crate::utils::images::{ImageStore, WebpDetection};

pub fn deck_image_store(layout: &ProjectLayout) -> ImageStore {
    ImageStore::new(layout.public_dir(), DECK_IMAGES, WebpDetection::Suffix)
}

/// Resolve every deck entry to a full card record, in deck order.
///
/// The card embedded in a deck entry is only used for its guid; stats and
/// artwork come from a separate `/api/Cards/<guid>` request per entry.
pub async fn normalize_deck<F: Fetch>(
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
        let quantity = entry.quantity();
        let guid = safe_optional_guid(entry.card_guid())?;
        pb.set_message(guid.clone());

        let detail: CardDetail = fetcher.get_json(&card_url(base, &guid)).await?;
        let image = card_image(fetcher, base, store, &guid, &detail, report).await?;

        let mut card = OutputCard::from_detail(guid, detail, image);
        card.quantity = Some(quantity);
        cards.push(card);
        pb.inc(1);
    }

    pb.finish_and_clear();
    report.cards = cards.len();
    Ok(cards)
}

/// Fetch deck `deck_guid`, store its artwork and write `src/data/decks/<guid>.json`.
pub async fn fetch_deck<F: Fetch>(
    fetcher: &F,
    base: &str,
    layout: &ProjectLayout,
    deck_guid: &str,
) -> Result<FetchReport> {
    let deck_guid = safe_guid(deck_guid)?;
    let mut report = FetchReport::default();

    let url = deck_url(base, &deck_guid);
    println!("Fetching deck from {}", url);
    let deck: DeckRecord = fetcher.get_json(&url).await?;
    let deck_name = deck.name.clone();
    println!(
        "Deck {:?} has {} entries, fetching card details...",
        text(&deck_name).unwrap_or("unnamed"),
        deck.deck_cards.as_ref().map_or(0, Vec::len)
    );

    let cards = normalize_deck(fetcher, base, &deck_image_store(layout), deck, &mut report).await?;

    let manifest = OutputManifest {
        source: SourceInfo::new(&deck_guid, deck_name, base),
        cards,
    };
    report.manifest = layout.deck_manifest(&deck_guid);
    write_manifest(&report.manifest, &manifest)?;

    report.print_summary();
    println!(
        "Wrote {} ({} unique cards; with quantities)",
        report.manifest.display(),
        report.cards
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::utils::http::mock::MockFetcher;
    use serde_json::{json, Value};
    use std::fs;

    const BASE: &str = "https://api.test";
    const DECK: &str = "6776ddb8-3ce0-470b-8d2c-afb26bd29359";
    const WOLF: &str = "11111111-1111-1111-1111-111111111111";
    const BEAR: &str = "22222222-2222-2222-2222-222222222222";
    const CITY: &str = "33333333-3333-3333-3333-333333333333";

    fn deck_body() -> Value {
        json!({
            "name": "Gaian Love for Life",
            "deckCards": [
                {"quantity": 3, "card": {"guid": WOLF, "name": "stub"}},
                {"quantity": null, "card": {"guid": BEAR.to_uppercase()}},
                {"card": {"guid": CITY}}
            ]
        })
    }

    fn fetcher() -> MockFetcher {
        MockFetcher::new()
            .with_json(&deck_url(BASE, DECK), deck_body())
            .with_json(
                &card_url(BASE, WOLF),
                json!({
                    "name": "Wolf",
                    "type": {"name": "Creature"},
                    "faction": {"name": "Gaian"},
                    "cost": 2,
                    "attack": 2,
                    "defense": 1,
                    "webp": "/arcmage/Cards/wolf/card.webp",
                    "jpeg": "/arcmage/Cards/wolf/card.jpg"
                }),
            )
            .with_json(
                &card_url(BASE, BEAR),
                json!({
                    "name": "Bear",
                    "subType": "Beast",
                    "jpeg": "https://cdn.test/bear.jpg"
                }),
            )
            .with_json(
                &card_url(BASE, CITY),
                json!({"name": "Lone City", "type": {"name": "City"}, "defense": 12}),
            )
            .with_asset("https://api.test/arcmage/Cards/wolf/card.webp", b"webp")
            .with_asset("https://cdn.test/bear.jpg", b"jpeg")
    }

    #[tokio::test]
    async fn cards_keep_deck_order_and_quantities() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let fetcher = fetcher();
        let deck: DeckRecord = serde_json::from_value(deck_body()).unwrap();
        let mut report = FetchReport::default();

        let cards = normalize_deck(&fetcher, BASE, &deck_image_store(&layout), deck, &mut report)
            .await
            .unwrap();

        let names: Vec<_> = cards.iter().map(|c| text(&c.name).unwrap()).collect();
        assert_eq!(names, ["Wolf", "Bear", "Lone City"]);
        let quantities: Vec<_> = cards.iter().map(|c| c.quantity.unwrap()).collect();
        assert_eq!(quantities, [3, 1, 1]);
        assert_eq!(cards[1].guid, BEAR);
        assert_eq!(cards[1].card_type, Some(json!("Beast")));
        assert_eq!(fetcher.json_requests.get(), 3);
    }

    #[tokio::test]
    async fn writes_manifest_and_images() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let fetcher = fetcher();

        let report = fetch_deck(&fetcher, BASE, &layout, &DECK.to_uppercase())
            .await
            .unwrap();

        assert_eq!(report.cards, 3);
        assert_eq!(report.downloaded, 2);
        assert_eq!(report.without_image, 1);
        assert_eq!(report.manifest, layout.deck_manifest(DECK));

        let manifest: Value =
            serde_json::from_str(&fs::read_to_string(&report.manifest).unwrap()).unwrap();
        assert_eq!(
            manifest["source"],
            json!({
                "deckGuid": DECK,
                "deckName": "Gaian Love for Life",
                "base": BASE,
                "license": "https://arcmage.org/license/"
            })
        );
        let cards = manifest["cards"].as_array().unwrap();
        assert_eq!(cards[0]["image"], json!(format!("arcmage/cards/{}.webp", WOLF)));
        assert_eq!(cards[1]["image"], json!(format!("arcmage/cards/{}.jpg", BEAR)));
        assert_eq!(cards[2]["image"], Value::Null);

        for card in cards {
            if let Some(image) = card["image"].as_str() {
                assert!(layout.public_dir().join(image).is_file());
            }
        }
    }

    #[tokio::test]
    async fn rerun_uses_cached_images_and_rewrites_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());

        fetch_deck(&fetcher(), BASE, &layout, DECK).await.unwrap();
        let manifest = layout.deck_manifest(DECK);
        fs::write(&manifest, "{}").unwrap();

        let second = fetcher();
        let report = fetch_deck(&second, BASE, &layout, DECK).await.unwrap();

        assert_eq!(second.asset_requests.get(), 0);
        assert_eq!(report.cached, 2);
        assert_eq!(report.downloaded, 0);
        assert_ne!(fs::read_to_string(&manifest).unwrap(), "{}");
    }

    #[tokio::test]
    async fn invalid_deck_guid_fails_before_any_request() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let fetcher = fetcher();

        let err = fetch_deck(&fetcher, BASE, &layout, "not-a-guid")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::InvalidIdentifier(_)));
        assert!(fetcher.requested.borrow().is_empty());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn invalid_card_guid_aborts_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let fetcher = MockFetcher::new().with_json(
            &deck_url(BASE, DECK),
            json!({"deckCards": [{"card": {"guid": "../../etc/passwd"}}]}),
        );

        let err = fetch_deck(&fetcher, BASE, &layout, DECK).await.unwrap_err();

        assert!(matches!(err, FetchError::InvalidIdentifier(ref g) if g == "../../etc/passwd"));
        assert!(!layout.deck_manifest(DECK).exists());
    }

    #[tokio::test]
    async fn odd_field_types_are_copied_into_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let fetcher = MockFetcher::new()
            .with_json(
                &deck_url(BASE, DECK),
                json!({"name": 42, "deckCards": [{"card": {"guid": WOLF}}]}),
            )
            .with_json(
                &card_url(BASE, WOLF),
                json!({"name": "X", "artist": 0, "artworkLicensor": {"id": 1}}),
            );

        let report = fetch_deck(&fetcher, BASE, &layout, DECK).await.unwrap();

        let manifest: Value =
            serde_json::from_str(&fs::read_to_string(&report.manifest).unwrap()).unwrap();
        assert_eq!(manifest["source"]["deckName"], json!(42));
        assert_eq!(manifest["cards"][0]["name"], json!("X"));
        assert_eq!(manifest["cards"][0]["artist"], json!(0));
        assert_eq!(manifest["cards"][0]["artworkLicensor"], json!({"id": 1}));
    }

    #[tokio::test]
    async fn failed_card_request_keeps_earlier_images_but_no_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let fetcher = MockFetcher::new()
            .with_json(&deck_url(BASE, DECK), deck_body())
            .with_json(
                &card_url(BASE, WOLF),
                json!({"name": "Wolf", "webp": "/wolf/card.webp"}),
            )
            .with_asset("https://api.test/wolf/card.webp", b"webp");

        let err = fetch_deck(&fetcher, BASE, &layout, DECK).await.unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert!(layout
            .public_dir()
            .join(format!("arcmage/cards/{}.webp", WOLF))
            .is_file());
        assert!(!layout.deck_manifest(DECK).exists());
    }
}
