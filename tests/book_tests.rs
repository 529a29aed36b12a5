//! End-to-end tests over the public API: bulk load, note edits, contact
//! removal, and autocomplete queries.

use contact_notes::book::{AddressBook, ContactEvent, ContactRecord, records_from_json};
use contact_notes::domain::{ContactId, Tag};
use contact_notes::scan;
use pretty_assertions::assert_eq;
use std::fs::File;
use std::io::Write;

fn id(n: i64) -> ContactId {
    ContactId::new(n)
}

fn tag(s: &str) -> Tag {
    Tag::new(s).unwrap()
}

// ===========================================
// scan scenarios
// ===========================================

#[test]
fn scan_reports_occurrences_with_ranges() {
    let text = "Met #Alice and #bob_2 today, re: #c!";
    let occurrences = scan(text);

    let surfaces: Vec<(&str, std::ops::Range<usize>)> = occurrences
        .iter()
        .map(|o| (o.surface(), o.range()))
        .collect();
    assert_eq!(
        surfaces,
        vec![("#Alice", 4..10), ("#bob_2", 15..21), ("#c", 33..35)]
    );

    let normalized: Vec<String> = occurrences
        .iter()
        .map(|o| o.to_tag().unwrap().as_str().to_string())
        .collect();
    assert_eq!(normalized, vec!["alice", "bob_2", "c"]);
}

#[test]
fn scan_with_no_tags_is_empty() {
    assert!(scan("no tags here").is_empty());
}

#[test]
fn scan_double_marker_adjacency() {
    let occurrences = scan("word##tag");
    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].surface(), "#tag");
    assert_eq!(occurrences[0].range(), 5..9);
}

// ===========================================
// Session lifecycle
// ===========================================

fn build_book() -> AddressBook {
    AddressBook::load(vec![
        ContactRecord::person(id(1), "Ada", "Lovelace").with_note("#math #vip pioneer"),
        ContactRecord::person(id(2), "Grace", "Hopper").with_note("#navy #vip"),
        ContactRecord::person(id(3), "Alan", "Turing").with_note("#math"),
        ContactRecord::organization(id(4), "Acme Corp"),
    ])
    .unwrap()
}

#[test]
fn autocomplete_over_loaded_corpus() {
    let book = build_book();

    let matches = book.tags_matching("");
    let all: Vec<&str> = matches.iter().map(|m| m.tag.as_str()).collect();
    assert_eq!(all, vec!["math", "navy", "vip"]);

    let matches = book.tags_matching("ma");
    assert_eq!(matches.len(), 1);
    let owners: Vec<i64> = matches[0].contacts.iter().map(|c| c.value()).collect();
    assert_eq!(owners, vec![1, 3]);
}

#[test]
fn note_edit_moves_contact_between_tags() {
    let mut book = build_book();

    book.apply(ContactEvent::NoteChanged {
        id: id(3),
        note: "#cryptography".to_string(),
    })
    .unwrap();

    let math = book.contacts_tagged(&tag("math"));
    assert_eq!(math.len(), 1);
    assert_eq!(math[0].display_name(), "Ada Lovelace");

    let matches = book.tags_matching("crypto");
    let crypto: Vec<&str> = matches.iter().map(|m| m.tag.as_str()).collect();
    assert_eq!(crypto, vec!["cryptography"]);
}

#[test]
fn shared_tag_disappears_with_its_last_owner() {
    let mut book = build_book();

    book.apply(ContactEvent::Removed { id: id(1) }).unwrap();
    let vip: Vec<i64> = book
        .tags_matching("vip")
        .into_iter()
        .flat_map(|m| m.contacts)
        .map(|c| c.value())
        .collect();
    assert_eq!(vip, vec![2]);

    book.apply(ContactEvent::NoteChanged {
        id: id(2),
        note: String::new(),
    })
    .unwrap();
    assert!(book.tags_matching("vip").is_empty());
    assert_eq!(book.index().tag_count(), 1); // only "math" left
}

#[test]
fn no_match_prefix_renders_as_empty_state() {
    let book = build_book();
    assert!(book.tags_matching("zzz").is_empty());
    assert!(book.contacts_tagged(&tag("unknown")).is_empty());
}

// ===========================================
// JSON fixture load
// ===========================================

#[test]
fn load_from_json_fixture_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contacts.json");
    let mut file = File::create(&path).unwrap();
    file.write_all(
        br##"[
            {"id": 10, "first_name": "Nora", "last_name": "Webb", "note": "intro at #meetup"},
            {"id": 11, "nickname": "Sam", "note": "#meetup #client"},
            {"id": 12, "organization_name": "Initech", "is_organization": true}
        ]"##,
    )
    .unwrap();

    let records = records_from_json(File::open(&path).unwrap()).unwrap();
    let book = AddressBook::load(records).unwrap();

    assert_eq!(book.contact_count(), 3);
    let meetup = book.contacts_tagged(&tag("meetup"));
    assert_eq!(meetup.len(), 2);

    let names: Vec<String> = meetup.iter().map(|r| r.display_name()).collect();
    assert_eq!(names, vec!["Nora Webb", "Sam"]);
}
