use linkcheck_engine::{
    decode_body, page_text, Classification, ContentClassifier, KeywordClassifier, ReviewSignal,
};
use pretty_assertions::assert_eq;

fn doc(title: &str, body: &str) -> String {
    format!("<html><head><title>{title}</title></head><body>{body}</body></html>")
}

#[test]
fn page_text_joins_lowercased_title_and_body() {
    let text = page_text(&doc("Hello World", "<p>Some <b>Bold</b> text</p>"));
    assert_eq!(text, "hello world some bold text");
}

#[test]
fn ordinary_pages_are_ok() {
    let classifier = KeywordClassifier::default();
    assert_eq!(
        classifier.classify(&doc("Acme Corp", "<h1>Welcome to our catalogue</h1>")),
        Classification::Ok
    );
}

#[test]
fn matching_ignores_case_and_word_boundaries() {
    let classifier = KeywordClassifier::default();
    assert_eq!(
        classifier.classify(&doc("PAGE NOT FOUND", "")),
        Classification::ParkedOrError
    );
    // A phrase inside a longer word still counts.
    assert_eq!(
        classifier.classify(&doc("", "xxsign inyy")),
        Classification::NeedsReview(ReviewSignal::Login)
    );
}

#[test]
fn title_alone_can_trigger_a_match() {
    let classifier = KeywordClassifier::default();
    assert_eq!(
        classifier.classify(&doc("Dominio en venta", "<p>Contacto</p>")),
        Classification::ParkedOrError
    );
}

#[test]
fn critical_errors_win_over_review_signals() {
    let classifier = KeywordClassifier::default();
    let html = doc("Sign in", "error 404 - ad blocker detected");
    assert_eq!(classifier.classify(&html), Classification::ParkedOrError);
}

#[test]
fn ad_blocker_is_checked_before_login() {
    let classifier = KeywordClassifier::default();
    let html = doc("", "Please disable ad blocker, then sign in");
    assert_eq!(
        classifier.classify(&html),
        Classification::NeedsReview(ReviewSignal::AdBlocker)
    );
}

#[test]
fn spanish_phrases_match_with_accents() {
    let classifier = KeywordClassifier::default();
    assert_eq!(
        classifier.classify(&doc("", "Por favor, INGRESE SU CONTRASEÑA")),
        Classification::NeedsReview(ReviewSignal::Login)
    );
}

#[test]
fn malformed_markup_is_still_classified() {
    let classifier = KeywordClassifier::default();
    let html = "<html><body><div><p>This domain is for sale<div></span>";
    assert_eq!(classifier.classify(html), Classification::ParkedOrError);
    assert_eq!(classifier.classify("<<<>>>"), Classification::Ok);
    assert_eq!(classifier.classify(""), Classification::Ok);
}

#[test]
fn custom_lists_are_lowercased() {
    let classifier = KeywordClassifier::new(&["Gone Fishing"], &[], &["Members Only"]);
    assert_eq!(
        classifier.classify(&doc("", "gone fishing")),
        Classification::ParkedOrError
    );
    assert_eq!(
        classifier.classify(&doc("MEMBERS ONLY", "")),
        Classification::NeedsReview(ReviewSignal::Login)
    );
    assert_eq!(
        classifier.classify(&doc("", "page not found")),
        Classification::Ok
    );
}

#[test]
fn latin1_bodies_decode_before_classification() {
    // "página no encontrada" in ISO-8859-1.
    let bytes = b"<html><body>p\xe1gina no encontrada</body></html>";
    let decoded = decode_body(bytes, Some("text/html; charset=ISO-8859-1"));
    assert!(!decoded.lossy);
    assert_eq!(
        KeywordClassifier::default().classify(&decoded.text),
        Classification::ParkedOrError
    );
}

#[test]
fn utf8_bom_overrides_a_wrong_charset() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice("contraseña requerida".as_bytes());
    let decoded = decode_body(&bytes, Some("text/html; charset=windows-1252"));
    assert_eq!(decoded.encoding_label, "UTF-8");
    assert_eq!(decoded.text, "contraseña requerida");
}

#[test]
fn undecodable_bytes_are_replaced_not_rejected() {
    let decoded = decode_body(b"ok \xff\xfe\xfd end", Some("text/html; charset=utf-8"));
    assert!(decoded.lossy);
    assert!(decoded.text.starts_with("ok "));
    assert!(decoded.text.contains('\u{FFFD}'));
}
