//! Sigma rendering against a YAML parser

use pretty_assertions::assert_eq;
use rulecraft::rule::{Condition, ListOp, RuleDraft};
use rulecraft::sigma::{
    DetectionCondition, Level, LogSourceField, SigmaCommand, SigmaList, SigmaModifier, SigmaRule,
    Status,
};
use serde_yaml::Value;

const ID: &str = "7d2c1b0e-3f4a-4b5c-9d6e-0f1a2b3c4d5e";

fn build(commands: Vec<SigmaCommand>) -> SigmaRule {
    commands
        .into_iter()
        .fold(SigmaRule::new(ID, "2024-05-01"), |rule, command| {
            let applied = rule.apply(command);
            assert!(applied.outcome.is_applied(), "{}", applied.outcome);
            applied.state
        })
}

fn condition(field: &str, modifier: SigmaModifier, value: &str) -> SigmaCommand {
    SigmaCommand::Selection(ListOp::Add(Condition::new(field, modifier, value)))
}

fn list(list: SigmaList, value: &str) -> SigmaCommand {
    SigmaCommand::List {
        list,
        op: ListOp::Add(value.to_string()),
    }
}

#[test]
fn test_powershell_scenario() {
    let rule = build(vec![
        SigmaCommand::SetTitle("Suspicious PowerShell".to_string()),
        SigmaCommand::SetStatus(Status::Stable),
        SigmaCommand::SetLevel(Level::High),
        condition("CommandLine", SigmaModifier::Contains, "-enc"),
        SigmaCommand::SetCondition(DetectionCondition::All),
    ]);

    let expected = format!(
        "title: Suspicious PowerShell\n\
         id: {ID}\n\
         status: Stable\n\
         date: 2024-05-01\n\
         level: High\n\
         logsource:\n\
         detection:\n  \
         selection:\n    \
         CommandLine|contains: \"-enc\"\n  \
         condition: selection"
    );
    assert_eq!(rule.render().unwrap(), expected);
}

#[test]
fn test_full_rule_is_valid_yaml() {
    let rule = build(vec![
        SigmaCommand::SetTitle("Encoded: PowerShell #1".to_string()),
        SigmaCommand::SetDescription("Detects \"encoded\" commands".to_string()),
        SigmaCommand::SetLicense("DRL".to_string()),
        SigmaCommand::SetModified("2024-06-01".to_string()),
        SigmaCommand::SetStatus(Status::Experimental),
        SigmaCommand::SetLevel(Level::Medium),
        list(SigmaList::Authors, "Blue Team"),
        list(SigmaList::Tags, "attack.execution"),
        list(SigmaList::Tags, "attack.t1059.001"),
        list(SigmaList::References, "https://example.com/ps"),
        list(SigmaList::FalsePositives, "Admin scripts"),
        list(SigmaList::Fields, "CommandLine"),
        list(SigmaList::Keywords, "FromBase64String"),
        SigmaCommand::SetLogSource {
            field: LogSourceField::Product,
            value: "windows".to_string(),
        },
        SigmaCommand::SetLogSource {
            field: LogSourceField::Category,
            value: "process_creation".to_string(),
        },
        condition("Image", SigmaModifier::EndsWith, "\\powershell.exe"),
        condition("CommandLine", SigmaModifier::Contains, "-enc"),
        condition("CommandLine", SigmaModifier::Contains, "-e "),
        SigmaCommand::SetFilter("User: SYSTEM".to_string()),
        SigmaCommand::SetTimeframe("5m".to_string()),
    ]);

    let text = rule.render().unwrap();
    let doc: Value = serde_yaml::from_str(&text).unwrap();

    assert_eq!(doc["title"], Value::from("Encoded: PowerShell #1"));
    assert_eq!(doc["description"], Value::from("Detects \"encoded\" commands"));
    assert_eq!(doc["authors"][0], Value::from("Blue Team"));
    assert_eq!(doc["tags"][1], Value::from("attack.t1059.001"));
    assert_eq!(doc["logsource"]["product"], Value::from("windows"));
    assert_eq!(
        doc["detection"]["selection"]["Image|endswith"],
        Value::from("\\powershell.exe")
    );
    assert_eq!(
        doc["detection"]["selection"]["CommandLine|contains|all"][1],
        Value::from("-e ")
    );
    assert_eq!(doc["detection"]["keywords"][0], Value::from("FromBase64String"));
    assert_eq!(doc["detection"]["filter"]["User"], Value::from("SYSTEM"));
    assert_eq!(
        doc["detection"]["condition"],
        Value::from("selection and keywords and not filter")
    );
    assert_eq!(doc["detection"]["timeframe"], Value::from("5m"));
    assert_eq!(doc["fields"][0], Value::from("CommandLine"));
}

#[test]
fn test_any_condition_renders_list_of_maps() {
    let rule = build(vec![
        SigmaCommand::SetTitle("Either".to_string()),
        condition("Image", SigmaModifier::EndsWith, "\\a.exe"),
        condition("Image", SigmaModifier::EndsWith, "\\b.exe"),
        SigmaCommand::SetCondition(DetectionCondition::Any),
    ]);
    let doc: Value = serde_yaml::from_str(&rule.render().unwrap()).unwrap();
    let selection = doc["detection"]["selection"].as_sequence().unwrap();
    assert_eq!(selection.len(), 2);
    assert_eq!(selection[1]["Image|endswith"], Value::from("\\b.exe"));
    assert_eq!(doc["detection"]["condition"], Value::from("selection"));
}

#[test]
fn test_section_order() {
    let rule = build(vec![
        SigmaCommand::SetTitle("Ordered".to_string()),
        list(SigmaList::Fields, "User"),
        list(SigmaList::FalsePositives, "Unknown"),
        list(SigmaList::Tags, "attack.discovery"),
        condition("EventID", SigmaModifier::Equals, "4688"),
    ]);
    let text = rule.render().unwrap();
    let keys: Vec<&str> = text
        .lines()
        .filter(|line| !line.starts_with(' '))
        .filter_map(|line| line.split(':').next())
        .collect();
    assert_eq!(
        keys,
        vec![
            "title",
            "id",
            "status",
            "date",
            "level",
            "tags",
            "falsepositives",
            "logsource",
            "detection",
            "fields"
        ]
    );
}

#[test]
fn test_removed_entries_are_not_rendered() {
    let rule = build(vec![
        SigmaCommand::SetTitle("Tags".to_string()),
        list(SigmaList::Tags, "a"),
        list(SigmaList::Tags, "b"),
        list(SigmaList::Tags, "c"),
        SigmaCommand::List {
            list: SigmaList::Tags,
            op: ListOp::Remove(1),
        },
    ]);
    assert!(rule.render().unwrap().contains("tags:\n  - a\n  - c\nlogsource:"));
}

#[test]
fn test_numeric_looking_text_reads_back_as_strings() {
    let rule = build(vec![
        SigmaCommand::SetTitle("0x10".to_string()),
        SigmaCommand::SetDescription(".inf".to_string()),
        SigmaCommand::SetLicense("0o17".to_string()),
        list(SigmaList::Tags, ".nan"),
        list(SigmaList::Fields, "1e3"),
        condition("EventID", SigmaModifier::Equals, "4624"),
    ]);
    let doc: Value = serde_yaml::from_str(&rule.render().unwrap()).unwrap();
    assert_eq!(doc["title"], Value::from("0x10"));
    assert_eq!(doc["description"], Value::from(".inf"));
    assert_eq!(doc["license"], Value::from("0o17"));
    assert_eq!(doc["tags"][0], Value::from(".nan"));
    assert_eq!(doc["fields"][0], Value::from("1e3"));
    assert_eq!(doc["detection"]["selection"]["EventID"], Value::from("4624"));
}

#[test]
fn test_indicator_field_names() {
    let rule = build(vec![SigmaCommand::SetTitle("Fields".to_string())]);
    for field in ["#Image", "&anchor", "*alias", "!tag", "'quoted'"] {
        let applied = rule
            .clone()
            .apply(condition(field, SigmaModifier::Contains, "x"));
        assert!(!applied.outcome.is_applied(), "{field}");
        assert_eq!(applied.state, rule);
    }

    // Loaded state bypasses the checks, so keys are still quoted on render
    let mut loaded = rule;
    loaded
        .detection
        .selection
        .insert(Condition::new("#Image", SigmaModifier::Contains, "x"));
    let doc: Value = serde_yaml::from_str(&loaded.render().unwrap()).unwrap();
    assert_eq!(doc["detection"]["selection"]["#Image|contains"], Value::from("x"));
}
