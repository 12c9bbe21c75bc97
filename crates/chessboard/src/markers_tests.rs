use super::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

fn sq(name: &str) -> Square {
    Square::parse(name).unwrap()
}

fn random_square(rng: &mut StdRng) -> Square {
    Square::from_index(rng.gen_range(0..64)).unwrap()
}

fn random_color(rng: &mut StdRng) -> AnnotationColor {
    *AnnotationColor::ALL.choose(rng).unwrap()
}

fn random_symbol(rng: &mut StdRng) -> AnnotationSymbol {
    const GLYPHS: &[u8] = b"ABCXYZabcxyz0189";
    if rng.gen_bool(0.3) {
        AnnotationSymbol::Named(*NamedSymbol::ALL.choose(rng).unwrap())
    } else {
        AnnotationSymbol::Char(*GLYPHS.choose(rng).unwrap() as char)
    }
}

#[test]
fn test_parse_square_markers() {
    let markers = parse_square_markers("Ga1,Yc5");
    assert_eq!(markers.len(), 2);
    assert_eq!(markers[&sq("a1")], AnnotationColor::Green);
    assert_eq!(markers[&sq("c5")], AnnotationColor::Yellow);
}

#[test]
fn test_parse_square_markers_skips_malformed_tokens() {
    let markers = parse_square_markers(" Ga1 , , Xb2, Gz9, R, Bc3d4, Yh8 ");
    assert_eq!(flatten_square_markers(&markers), "Ga1,Yh8");
}

#[test]
fn test_parse_square_markers_later_duplicate_wins() {
    let markers = parse_square_markers("Ge4,Re4");
    assert_eq!(markers[&sq("e4")], AnnotationColor::Red);
}

#[test]
fn test_flatten_square_markers_is_sorted() {
    let markers = parse_square_markers("Yh8,Bb2,Ga1,Rb1");
    assert_eq!(flatten_square_markers(&markers), "Ga1,Rb1,Bb2,Yh8");
}

#[test]
fn test_parse_text_markers() {
    let markers = parse_text_markers("RAe4,G(plus)d5,B7a1");
    assert_eq!(markers[&sq("e4")], TextMarker::new(AnnotationSymbol::Char('A'), AnnotationColor::Red));
    assert_eq!(
        markers[&sq("d5")],
        TextMarker::new(AnnotationSymbol::Named(NamedSymbol::Plus), AnnotationColor::Green)
    );
    assert_eq!(markers[&sq("a1")].symbol, AnnotationSymbol::Char('7'));
}

#[test]
fn test_parse_text_markers_skips_unknown_symbols() {
    let markers = parse_text_markers("R!e4,G(star)d5,RABe4,Re4,Y(dot)c3");
    assert_eq!(flatten_text_markers(&markers), "Y(dot)c3");
}

#[test]
fn test_flatten_text_markers_skips_invalid_glyphs() {
    let mut markers = TextMarkerSet::new();
    markers.insert(sq("a1"), TextMarker::new(AnnotationSymbol::Char('#'), AnnotationColor::Red));
    markers.insert(sq("b1"), TextMarker::new(AnnotationSymbol::Char('z'), AnnotationColor::Blue));
    assert_eq!(flatten_text_markers(&markers), "Bzb1");
}

#[test]
fn test_parse_arrow_markers() {
    let markers = parse_arrow_markers("Re4d6, Bb1c3");
    assert_eq!(markers[&Vector::new(sq("e4"), sq("d6"))], AnnotationColor::Red);
    assert_eq!(markers[&Vector::new(sq("b1"), sq("c3"))], AnnotationColor::Blue);
}

#[test]
fn test_parse_arrow_markers_skips_degenerate_and_malformed() {
    let markers = parse_arrow_markers("Re4e4,Ge4,Ye4d9,Bb1c3x,Ga1h8");
    assert_eq!(flatten_arrow_markers(&markers), "Ga1h8");
}

#[test]
fn test_square_markers_round_trip() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..100 {
        let mut markers = SquareMarkerSet::new();
        for _ in 0..rng.gen_range(0..12) {
            markers.insert(random_square(&mut rng), random_color(&mut rng));
        }
        assert_eq!(parse_square_markers(&flatten_square_markers(&markers)), markers);
    }
}

#[test]
fn test_text_markers_round_trip() {
    let mut rng = StdRng::seed_from_u64(2);
    for _ in 0..100 {
        let mut markers = TextMarkerSet::new();
        for _ in 0..rng.gen_range(0..12) {
            let marker = TextMarker::new(random_symbol(&mut rng), random_color(&mut rng));
            markers.insert(random_square(&mut rng), marker);
        }
        assert_eq!(parse_text_markers(&flatten_text_markers(&markers)), markers);
    }
}

#[test]
fn test_arrow_markers_round_trip() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..100 {
        let mut markers = ArrowMarkerSet::new();
        for _ in 0..rng.gen_range(0..12) {
            let vector = Vector::new(random_square(&mut rng), random_square(&mut rng));
            if !vector.is_degenerate() {
                markers.insert(vector, random_color(&mut rng));
            }
        }
        assert_eq!(parse_arrow_markers(&flatten_arrow_markers(&markers)), markers);
    }
}

#[test]
fn test_marker_spec_tables_skip_invalid_entries() {
    let table: BTreeMap<String, String> = [
        ("e4", "g"),
        ("d5", "purple"),
        ("z9", "r"),
        ("a1", "Yellow"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    let markers = MarkerSpec::Table(table).square_markers();
    assert_eq!(flatten_square_markers(&markers), "Ya1,Ge4");
}

#[test]
fn test_marker_spec_text_table() {
    let table: BTreeMap<String, String> = [("e4", "Ag"), ("d5", "(plus)r"), ("c3", "??")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let markers = MarkerSpec::Table(table).text_markers();
    assert_eq!(flatten_text_markers(&markers), "R(plus)d5,GAe4");
}

#[test]
fn test_annotation_color_from_name() {
    assert_eq!(AnnotationColor::from_name("g"), Some(AnnotationColor::Green));
    assert_eq!(AnnotationColor::from_name("RED"), Some(AnnotationColor::Red));
    assert_eq!(AnnotationColor::from_name("x"), None);
    assert_eq!("b".parse::<AnnotationColor>(), Ok(AnnotationColor::Blue));
}
