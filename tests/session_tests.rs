//! Session lifecycle and properties that hold for any input

use proptest::prelude::*;
use rulecraft::ident::{self, Ledger};
use rulecraft::rule::{ListOp, NamedList, Outcome, RuleKind};
use rulecraft::session::{
    create_session, export, mutate, reset_session, serialize, validate, Command, Draft,
};
use rulecraft::sigma::{SigmaCommand, SigmaList};
use rulecraft::snort::SnortCommand;
use rulecraft::yara::YaraCommand;

fn sid_of(draft: &Draft) -> u32 {
    match draft {
        Draft::Snort(rule) => rule.sid().unwrap(),
        other => panic!("expected a snort draft, got {:?}", other.kind()),
    }
}

#[test]
fn test_sessions_are_independent() {
    let sigma = create_session(RuleKind::Sigma);
    let snort = create_session(RuleKind::Snort);

    let snort = mutate(snort, Command::Snort(SnortCommand::SetMsg("only snort".to_string()))).state;
    assert!(validate(&snort).is_ok());
    assert!(!validate(&sigma).is_ok());
}

#[test]
fn test_reset_never_reissues_sid() {
    let mut session = create_session(RuleKind::Snort);
    let mut seen = vec![sid_of(session.draft())];
    for _ in 0..50 {
        session = reset_session(session);
        let sid = sid_of(session.draft());
        assert!(!seen.contains(&sid));
        seen.push(sid);
    }
    assert_eq!(session.ledger().issued_sids(), 51);
}

#[test]
fn test_export_names() {
    let sigma = mutate(
        create_session(RuleKind::Sigma),
        Command::Sigma(SigmaCommand::SetTitle("Lateral  Movement via PsExec".to_string())),
    )
    .state;
    let file = export(&sigma).unwrap();
    assert_eq!(file.file_name, "Lateral_Movement_via_PsExec.yml");
    assert!(file.contents.ends_with('\n'));

    let yara = mutate(
        create_session(RuleKind::Yara),
        Command::Yara(YaraCommand::SetRuleName("Cobalt Strike Beacon".to_string())),
    )
    .state;
    assert_eq!(export(&yara).unwrap().file_name, "Cobalt_Strike_Beacon.yar");

    let snort = mutate(
        create_session(RuleKind::Snort),
        Command::Snort(SnortCommand::SetMsg("x".to_string())),
    )
    .state;
    let snort = mutate(snort, Command::Snort(SnortCommand::SetSid(424242))).state;
    assert_eq!(export(&snort).unwrap().file_name, "snort_rule_424242.rules");
    assert!(snort.ledger().has_sid(424242));
}

#[test]
fn test_validation_failure_lists_every_violation() {
    let session = create_session(RuleKind::Snort);
    let Draft::Snort(mut rule) = session.draft().clone() else {
        panic!("expected a snort draft");
    };
    rule.options.sid = None;
    let session: rulecraft::Session = Draft::Snort(rule).into();
    let err = serialize(&session).unwrap_err();
    assert_eq!(err.violations().unwrap().len(), 2);
    assert!(err.to_string().contains("snort rule is incomplete (2 violations)"));
}

#[test]
fn test_duplicate_tag_is_not_an_error() {
    let add = || {
        Command::Sigma(SigmaCommand::List {
            list: SigmaList::Tags,
            op: ListOp::Add("attack.t1003".to_string()),
        })
    };
    let applied = mutate(create_session(RuleKind::Sigma), add());
    assert_eq!(applied.outcome, Outcome::Applied);
    let applied = mutate(applied.state, add());
    assert_eq!(applied.outcome, Outcome::Duplicate);
}

proptest! {
    #[test]
    fn test_generated_identifiers_have_the_right_shape(_seed in 0u8..32) {
        prop_assert!(ident::is_uuid_v4(&ident::generate_uuid_v4()));
        let sid = ident::generate_sid();
        prop_assert!((ident::SID_MIN..=ident::SID_MAX).contains(&sid));
        prop_assert_eq!(sid.to_string().len(), 6);
    }

    #[test]
    fn test_ledger_never_repeats(count in 1usize..200) {
        let mut ledger = Ledger::new();
        let mut sids: Vec<u32> = (0..count).map(|_| ledger.fresh_sid()).collect();
        sids.sort_unstable();
        sids.dedup();
        prop_assert_eq!(sids.len(), count);
    }

    #[test]
    fn test_serialization_is_deterministic(
        title in "[A-Za-z][A-Za-z0-9 ]{0,30}",
        tags in prop::collection::vec("[a-z]{1,8}\\.[a-z0-9]{1,6}", 0..6),
    ) {
        let mut session = mutate(
            create_session(RuleKind::Sigma),
            Command::Sigma(SigmaCommand::SetTitle(title)),
        )
        .state;
        for tag in tags {
            session = mutate(
                session,
                Command::Sigma(SigmaCommand::List { list: SigmaList::Tags, op: ListOp::Add(tag) }),
            )
            .state;
        }
        prop_assert_eq!(serialize(&session).unwrap(), serialize(&session).unwrap());
    }

    #[test]
    fn test_insertion_order_is_preserved(values in prop::collection::vec("[a-z]{1,10}", 0..20)) {
        let mut list = NamedList::new();
        let mut expected: Vec<String> = Vec::new();
        for value in values {
            let outcome = list.insert(value.clone());
            if expected.contains(&value) {
                prop_assert_eq!(outcome, Outcome::Duplicate);
            } else {
                expected.push(value);
            }
        }
        let actual: Vec<String> = list.into_iter().collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn test_removal_keeps_relative_order(values in prop::collection::btree_set("[a-z]{1,6}", 2..10), pick in any::<prop::sample::Index>()) {
        let values: Vec<String> = values.into_iter().collect();
        let index = pick.index(values.len());
        let mut list: NamedList<String> = values.iter().cloned().collect();
        prop_assert_eq!(list.remove(index), Outcome::Applied);

        let mut expected = values.clone();
        expected.remove(index);
        prop_assert_eq!(list.as_slice(), expected.as_slice());
    }
}
