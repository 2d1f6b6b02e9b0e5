use paperwatch_arxiv::parse_feed;

fn main() {
    divan::main();
}

const FEED: &str = include_str!("../tests/fixtures/feed.xml");

#[divan::bench]
fn parse_fixture() -> usize {
    parse_feed(divan::black_box(FEED)).map_or(0, |p| p.entries.len())
}

#[divan::bench]
fn parse_and_normalize() -> usize {
    parse_feed(divan::black_box(FEED))
        .map(|p| p.entries.into_iter().filter_map(|e| e.into_record().ok()).count())
        .unwrap_or(0)
}
