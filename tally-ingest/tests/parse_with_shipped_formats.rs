//! End-to-end runs of the extraction pipeline against the format configs
//! shipped under `formats/`.

use std::path::PathBuf;

use tally_core::FieldValue;
use tally_ingest::{
    format_for_import, CreditCardParser, FormatRegistry, ParsedStatement, StatementParser,
};

fn formats_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("formats")
}

fn credit_card_parser() -> CreditCardParser {
    CreditCardParser::new(FormatRegistry::load(&[
        formats_dir().join("credit_card_formats.json")
    ]))
}

fn statement_parser() -> StatementParser {
    StatementParser::new(FormatRegistry::load(&[
        formats_dir().join("statement_formats.json")
    ]))
}

const CHASE_CREDIT_TEXT: &str = "\
JPMorgan Chase Bank - Cardmember Service
www.chase.com
Opening/Closing Date 12/06/24 - 01/05/25
Payment Due Date: 02/01/25
New Balance: $64.72
Minimum Payment Due: $25.00

PURCHASE
12/16 Ultra Pure Water Tracy CA 48.00
12/27 UA INFLT 0164460117919 HOUSTON TX 8.00
01/08 SAHI SHEIKH INC SUNNYVALE CA 8.72
Total fees charged in 2024
";

const FIDELITY_TEXT: &str = "\
Fidelity Brokerage Services LLC
Your portfolio statement
Statement Period: 12/01/2024 to 12/31/2024
Beginning Account Value: $10,000.00
Ending Account Value: $12,500.00
Total Market Value: $12,400.00
Total Cost Basis: $9,800.00
Total Unrealized Gain/Loss: $2,600.00
Your Holdings
AAPL Apple Inc 10 $195.00 $1,500.00 $1,950.00 $450.00
VTI Vanguard Total Market 25 $242.00 $5,500.00 $6,050.00 $550.00
Total Holdings
";

const CHASE_BANK_TEXT: &str = "\
JPMorgan Chase Bank, N.A.
Chase Total Checking
Statement Period: 04/01/2024 through 04/30/2024
Beginning Balance: $68.70
TRANSACTION DETAIL
04/22 Discover E-Payment 8148 Web ID: 123 -15.00 53.70
04/23 PAYROLL ACME INC 100.00 153.70
Ending Balance: $153.70
";

#[test]
fn test_shipped_credit_card_configs_load_in_declared_order() {
    let parser = credit_card_parser();
    let keys: Vec<&str> = parser.registry().keys().collect();
    assert_eq!(keys, vec!["chase_credit", "citi_credit", "generic_credit_card"]);
}

#[test]
fn test_chase_credit_statement_end_to_end() {
    let statement = credit_card_parser().parse_text(CHASE_CREDIT_TEXT);

    assert_eq!(statement.provider_key, "chase_credit");
    assert_eq!(statement.provider, "Chase Credit Card");
    assert_eq!(
        statement.statement_date,
        Some(FieldValue::Text("01/05/25".into()))
    );
    assert_eq!(
        statement.payment_due_date,
        Some(FieldValue::Text("02/01/25".into()))
    );
    assert_eq!(statement.new_balance, Some(FieldValue::Number(64.72)));
    assert_eq!(statement.minimum_payment_due, Some(FieldValue::Number(25.0)));
    assert_eq!(statement.warnings, None);

    assert_eq!(statement.total_transactions, 3);
    assert_eq!(statement.transactions[0].date, "12/16");
    assert_eq!(
        statement.transactions[0].description,
        "Ultra Pure Water Tracy CA"
    );
    assert_eq!(statement.transactions[0].amount, "48.00");
    assert_eq!(
        statement.transactions[1].description,
        "UA INFLT 0164460117919 HOUSTON TX"
    );
    assert_eq!(statement.transactions[2].amount, "8.72");
}

#[test]
fn test_chase_credit_import_summary() {
    let statement = credit_card_parser().parse_text(CHASE_CREDIT_TEXT);
    let summary = format_for_import(&statement);

    assert_eq!(summary.provider_key, "chase_credit");
    assert_eq!(summary.new_balance, "64.72");
    assert_eq!(summary.total_transactions, 3);
    assert_eq!(summary.warnings, "");
    assert!(summary
        .transactions
        .iter()
        .all(|t| t.category == "Uncategorized" && t.kind == "credit_card_transaction"));
}

#[test]
fn test_fidelity_investment_statement_end_to_end() {
    let parser = statement_parser();
    assert_eq!(
        parser.detect(FIDELITY_TEXT),
        Some("fidelity_investment".to_string())
    );

    let ParsedStatement::Investment(statement) = parser.parse_text(FIDELITY_TEXT, None) else {
        panic!("expected investment statement");
    };

    assert_eq!(statement.format_detected, "Fidelity Investment Statement");
    assert_eq!(statement.opening_balance, Some(FieldValue::Number(10_000.0)));
    assert_eq!(statement.ending_balance, Some(FieldValue::Number(12_500.0)));
    assert_eq!(statement.period_gain_loss, Some(2_500.0));
    assert_eq!(
        statement.total_market_value,
        Some(FieldValue::Number(12_400.0))
    );

    assert_eq!(statement.securities.len(), 2);
    let apple = &statement.securities[0];
    assert_eq!(apple.symbol.as_deref(), Some("AAPL"));
    assert_eq!(apple.description.as_deref(), Some("Apple Inc"));
    assert_eq!(apple.quantity, 10.0);
    assert_eq!(apple.share_price, 195.0);
    assert_eq!(apple.total_cost, 1_500.0);
    assert_eq!(apple.market_value, 1_950.0);
    assert_eq!(apple.unrealized_gain_loss, 450.0);
    assert_eq!(apple.security_type, "Unknown");
}

#[test]
fn test_chase_banking_statement_end_to_end() {
    let parser = statement_parser();
    assert_eq!(
        parser.detect(CHASE_BANK_TEXT),
        Some("chase_banking".to_string())
    );

    let ParsedStatement::Banking(statement) = parser.parse_text(CHASE_BANK_TEXT, None) else {
        panic!("expected banking statement");
    };

    assert_eq!(statement.format_detected, "Chase Checking Statement");
    assert_eq!(statement.opening_balance, Some(FieldValue::Number(68.70)));
    assert_eq!(statement.ending_balance, Some(FieldValue::Number(153.70)));

    assert_eq!(statement.transactions.len(), 2);
    assert_eq!(
        statement.transactions[0].description,
        "Discover E-Payment 8148 Web ID: 123"
    );
    assert_eq!(statement.transactions[0].amount, "-15.00");
    assert_eq!(statement.transactions[1].amount, "100.00");
}

#[test]
fn test_unknown_text_drops_to_fallback() {
    let ParsedStatement::Investment(statement) =
        statement_parser().parse_text("miscellaneous notes with nothing useful", None)
    else {
        panic!("expected fallback investment shape");
    };
    assert_eq!(statement.format_detected, "Unknown (Fallback)");
    assert!(statement.parsing_notes.is_some());
    assert!(statement.securities.is_empty());
}

#[test]
fn test_add_custom_format_persists_and_reloads() {
    use tally_ingest::{FormatKind, ProviderConfig, ScalarPattern, ValueType};

    let save_path =
        std::env::temp_dir().join(format!("tally_custom_formats_{}.json", std::process::id()));
    let _ = std::fs::remove_file(&save_path);

    let mut fields = std::collections::HashMap::new();
    fields.insert(
        "new_balance".to_string(),
        ScalarPattern::new(r"Amount Owed[:\s]+\$?([\d,]+\.\d{2})").with_type(ValueType::Number),
    );
    let custom = ProviderConfig {
        name: "FSU Credit Union".to_string(),
        kind: FormatKind::CreditCard,
        keywords: vec!["FSU".to_string(), "Credit Union".to_string()],
        required_fields: vec![],
        patterns: tally_ingest::PatternSet {
            fields,
            ..Default::default()
        },
    };

    let mut registry = FormatRegistry::default().with_save_path(&save_path);
    registry.add("fsu_credit", custom).unwrap();

    let reloaded = FormatRegistry::load(&[&save_path]);
    let config = reloaded.get("fsu_credit").expect("custom format persisted");
    assert_eq!(config.name, "FSU Credit Union");
    assert_eq!(
        config.patterns.field("new_balance").unwrap().value_type,
        Some(ValueType::Number)
    );

    let _ = std::fs::remove_file(&save_path);
}
