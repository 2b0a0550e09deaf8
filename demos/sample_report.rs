//! Renders a sample incident report to `sample_report.pdf`.
//!
//! Usage: `cargo run --example sample_report [FONT_FILE]`
//!
//! Set `RUST_LOG=info` to see which font was selected.

use std::env;
use std::path::PathBuf;
use std::process;

use incident_report::{FontConfig, FontResolver, HostEnvironment, ReportGenerator, ReportRecord};

fn sample_record() -> ReportRecord {
    ReportRecord {
        facility_name: "放課後等デイサービス テスト事業所".to_owned(),
        year: "2024".to_owned(),
        month: "12".to_owned(),
        day: "25".to_owned(),
        weekday: "水".to_owned(),
        hour: "15".to_owned(),
        minute: "30".to_owned(),
        location: "プレイルーム".to_owned(),
        subject: "山田 太郎".to_owned(),
        situation: "バランスボールで遊んでいた際に、バランスを崩して転倒しました。\n\
                    手首を強く打ち、痛がっていました。"
            .to_owned(),
        process: "直ちに職員が駆けつけ、状況を確認しました。\n\
                  手首を冷やし、保護者に連絡を取って状況を説明しました。\n\
                  保護者の了解を得て、医療機関を受診することになりました。"
            .to_owned(),
        cause: "・環境要因：バランスボールの使用環境に注意が不足していた\n\
                ・人的要因：職員の監視が不十分だった"
            .to_owned(),
        countermeasure: "・バランスボール使用時の安全ルールを再確認\n\
                         ・職員の監視体制を強化\n\
                         ・定期的な安全点検の実施"
            .to_owned(),
        others: "保護者には迅速に連絡し、適切な対応ができました。".to_owned(),
        reporter: "佐藤 花子".to_owned(),
        record_date: "2024年12月25日".to_owned(),
    }
}

fn main() {
    env_logger::init();

    let mut config = FontConfig::default();
    if let Some(path) = env::args_os().nth(1) {
        config = config.with_explicit_path(PathBuf::from(path));
    }
    let font = FontResolver::new(config).resolve(&HostEnvironment);
    println!("Using the {} {}", font.tier(), font.name());

    let record = sample_record();
    if let Err(err) = record.validate_required() {
        eprintln!("Incomplete report: {}", err);
        process::exit(1);
    }

    let document = match ReportGenerator::new(font).generate(&record) {
        Ok(document) => document,
        Err(err) => {
            eprintln!("Failed to render the report: {}", err);
            process::exit(1);
        }
    };
    let plan = document.plan();
    if let Some(ratio) = plan.compression {
        println!("The table was compressed by a factor of {:.2}", ratio);
    }

    let output = "sample_report.pdf";
    match document.save(output) {
        Ok(()) => println!("Saved {} ({})", output, record.suggested_filename()),
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    }
}
