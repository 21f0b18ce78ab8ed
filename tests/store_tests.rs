//! Editing command integration tests: selection, referential integrity and
//! flow-mode behavior through the public store API.

use scene_graph::core::integrity::Issue;
use scene_graph::schema::character::{CharacterField, Emotion, Position};
use scene_graph::schema::dialogue::DialogueField;
use scene_graph::schema::scene::{Choice, ChoiceField, Next, SceneUpdate};
use scene_graph::SceneStore;
use std::sync::Arc;

#[test]
fn delete_sweeps_single_and_choice_references() {
    let mut store = SceneStore::new();
    store.add_scene(Some("a")).unwrap();
    store.add_scene(Some("b")).unwrap();
    store.add_scene(Some("c")).unwrap();

    store.update_scene("a", SceneUpdate::new().next(Next::single("b")));
    store.select(Some("c"));
    store.set_flow_mode(true);
    store.update_choice(0, ChoiceField::Text("Go to b".to_string()));
    store.update_choice(0, ChoiceField::Target("b".to_string()));
    store.add_choice();
    store.update_choice(1, ChoiceField::Text("Back to a".to_string()));
    store.update_choice(1, ChoiceField::Target("a".to_string()));

    store.delete_scene("b");

    assert_eq!(store.scene("a").unwrap().next, Next::Single(String::new()));
    let choices = store.scene("c").unwrap().next.choices().unwrap().to_vec();
    assert_eq!(
        choices,
        vec![Choice::new("Go to b", ""), Choice::new("Back to a", "a")]
    );
    assert!(store.validate().is_empty());
}

#[test]
fn delete_keeps_choice_set_even_when_all_targets_cleared() {
    let mut store = SceneStore::new();
    store.add_scene(Some("gone")).unwrap();
    store.add_scene(Some("hub")).unwrap();
    store.set_flow_mode(true);
    store.update_choice(0, ChoiceField::Target("gone".to_string()));

    store.delete_scene("gone");

    let hub = store.scene("hub").unwrap();
    assert!(hub.next.is_choices());
    assert_eq!(hub.next.choices().unwrap(), &[Choice::empty()]);
}

#[test]
fn end_to_end_intro_end() {
    let mut store = SceneStore::new();
    store.add_scene(Some("intro")).unwrap();
    store.add_scene(Some("end")).unwrap();
    store.update_scene("intro", SceneUpdate::new().next(Next::single("end")));
    store.delete_scene("end");

    let snap = store.snapshot();
    assert_eq!(snap.len(), 1);
    assert_eq!(snap.scenes()[0].id, "intro");
    assert_eq!(snap.scenes()[0].next, Next::Single(String::new()));
    assert_eq!(snap.selection(), Some("intro"));
}

#[test]
fn no_two_scenes_share_an_id() {
    let mut store = SceneStore::new();
    let requests = [
        None,
        Some("scene_3"),
        None,
        Some("scene_1"),
        None,
        Some("intro"),
        Some("intro"),
        None,
    ];
    for request in requests {
        let before = store.scenes().len();
        match store.add_scene(request) {
            Ok(snap) => assert_eq!(snap.len(), before + 1),
            Err(e) => {
                assert!(e.is_duplicate_id());
                assert_eq!(store.scenes().len(), before);
            }
        }
    }

    let mut ids: Vec<&str> = store.scenes().iter().map(|s| s.id.as_str()).collect();
    let total = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), total);
}

#[test]
fn generated_id_after_deletion_does_not_collide() {
    let mut store = SceneStore::new();
    for _ in 0..3 {
        store.add_scene(None).unwrap();
    }
    store.delete_scene("scene_2");
    let snap = store.add_scene(None).unwrap();
    assert_eq!(snap.scenes().last().unwrap().id, "scene_4");
}

#[test]
fn flow_mode_round_trip_discards_choices() {
    let mut store = SceneStore::new();
    store.add_scene(Some("a")).unwrap();
    store.set_flow_mode(true);
    store.update_choice(0, ChoiceField::Text("Stay".to_string()));
    store.add_choice();
    store.update_choice(1, ChoiceField::Target("a".to_string()));

    store.set_flow_mode(true);
    assert_eq!(store.current_scene().unwrap().next, Next::one_empty_choice());

    store.add_choice();
    store.set_flow_mode(false);
    assert_eq!(store.current_scene().unwrap().next, Next::Single(String::new()));
}

#[test]
fn removing_last_choice_collapses_to_single() {
    let mut store = SceneStore::new();
    store.add_scene(Some("a")).unwrap();
    store.add_choice();
    store.remove_choice(0);
    assert_eq!(store.current_scene().unwrap().next, Next::Single(String::new()));
}

#[test]
fn out_of_range_indices_are_noops() {
    let mut store = SceneStore::new();
    store.add_scene(Some("a")).unwrap();
    store.add_dialogue();
    let before = store.snapshot();

    store.update_dialogue(4, DialogueField::SpeakerName("nobody".to_string()));
    store.remove_dialogue(4);
    store.update_character(0, 0, CharacterField::Visible(false));
    store.remove_character(0, 2);
    store.remove_choice(0);
    store.update_choice(0, ChoiceField::Text("x".to_string()));

    assert!(Arc::ptr_eq(&before, &store.snapshot()));
}

#[test]
fn character_editing_scoped_to_selection() {
    let mut store = SceneStore::new();
    store.add_scene(Some("a")).unwrap();
    store.add_dialogue();
    store.add_character(0);
    store.update_character(0, 0, CharacterField::Name("Aoi".to_string()));
    store.update_character(0, 0, CharacterField::Position(Position::Left));
    store.update_character(0, 0, CharacterField::IsSpeaking(true));

    store.add_scene(Some("b")).unwrap();
    store.add_dialogue();
    store.add_character(0);
    store.update_character(0, 0, CharacterField::Emotion(Emotion::Angry));

    let a = &store.scene("a").unwrap().dialogue[0].characters[0];
    assert_eq!(a.name, "Aoi");
    assert_eq!(a.position, Position::Left);
    assert!(a.is_speaking);
    assert_eq!(a.emotion, Emotion::Neutral);

    let b = &store.scene("b").unwrap().dialogue[0].characters[0];
    assert_eq!(b.emotion, Emotion::Angry);
    assert_ne!(a.id, b.id);
}

#[test]
fn rename_then_delete_uses_new_id() {
    let mut store = SceneStore::new();
    store.add_scene(Some("a")).unwrap();
    store.add_scene(Some("b")).unwrap();
    store.update_scene("a", SceneUpdate::new().next(Next::single("b")));
    store.rename_scene("b", "b2").unwrap();
    assert_eq!(store.scene("a").unwrap().next, Next::single("b2"));

    store.delete_scene("b2");
    assert_eq!(store.scene("a").unwrap().next, Next::unset());
}

#[test]
fn validate_reports_dangling_target_set_by_hand() {
    let mut store = SceneStore::new();
    store.add_scene(Some("a")).unwrap();
    store.set_single_target("nowhere");
    assert_eq!(
        store.validate(),
        vec![Issue::DanglingTarget {
            scene: "a".to_string(),
            choice: None,
            target: "nowhere".to_string(),
        }]
    );
}

#[test]
fn add_character_after_importing_max_suffix_is_refused() {
    let mut store = SceneStore::new();
    store
        .import(r#"{"scenes":[{"id":"a","dialogue":[{"characters":[{"id":"char_18446744073709551615"}]}]}]}"#)
        .unwrap();
    let before = store.snapshot();

    let after = store.add_character(0);
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(store.scene("a").unwrap().dialogue[0].characters.len(), 1);
}
