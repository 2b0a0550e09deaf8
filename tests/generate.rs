use std::path::Path;
use std::thread;

use incident_report::draft::DraftSections;
use incident_report::fonts::Builtin;
use incident_report::resolve::{EmptyEnvironment, ResolutionTier};
use incident_report::{
    FontConfig, FontResolver, LayoutConfig, OverflowPolicy, ReportGenerator, ReportRecord,
    ResolvedFont,
};

fn sample_record() -> ReportRecord {
    ReportRecord {
        facility_name: "放課後等デイサービス テスト事業所".to_owned(),
        year: "2024".to_owned(),
        month: "3".to_owned(),
        day: "5".to_owned(),
        weekday: "火".to_owned(),
        hour: "16".to_owned(),
        minute: "30".to_owned(),
        location: "プレイルーム".to_owned(),
        subject: "山田 太郎".to_owned(),
        situation: "バランスボールで遊んでいた際に、バランスを崩して転倒しました。".to_owned(),
        process: "職員がすぐに駆けつけ、怪我の有無を確認しました。\n右手首に軽い擦り傷があったため、消毒を行いました。".to_owned(),
        cause: "ボールの空気圧が高く、不安定な状態でした。".to_owned(),
        countermeasure: "ボールの空気圧を定期的に確認し、使用時は職員が補助します。".to_owned(),
        others: "特になし".to_owned(),
        reporter: "佐藤 花子".to_owned(),
        record_date: "2024年3月5日".to_owned(),
    }
}

fn heisei_generator() -> ReportGenerator {
    ReportGenerator::new(ResolvedFont::builtin(Builtin::HeiseiKakuGo))
}

#[test]
fn generate_is_idempotent() {
    let generator = heisei_generator();
    let record = sample_record();
    let first = generator.generate(&record).unwrap();
    let second = generator.generate(&record).unwrap();
    assert_eq!(first.as_bytes(), second.as_bytes());
    assert!(first.as_bytes().starts_with(b"%PDF-"));
}

#[test]
fn empty_record_renders_blank_form() {
    let document = heisei_generator().generate(&ReportRecord::default()).unwrap();
    let plan = document.plan();
    assert!(plan.rows.iter().all(|row| (row.height.0 - 15.0).abs() < 0.001));
    assert_eq!(plan.compression, None);
    assert!(plan.acknowledgement);

    let doc = lopdf::Document::load_mem(document.as_bytes()).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn long_cause_is_compressed() {
    let mut record = sample_record();
    record.cause = "事故原因に関する詳細な記述。".repeat(50);
    let document = heisei_generator().generate(&record).unwrap();
    let plan = document.plan();
    let ratio = plan.compression.expect("the table should be compressed");
    assert!(ratio < 1.0);
    assert!(!plan.acknowledgement);
    assert!(plan.table_height() <= plan.budget + incident_report::Mm(0.01));
}

#[test]
fn fail_policy_reports_overflow() {
    let mut record = sample_record();
    record.cause = "事故原因に関する詳細な記述。".repeat(50);
    let generator = heisei_generator()
        .with_config(LayoutConfig::default().with_overflow_policy(OverflowPolicy::Fail));
    let err = generator.generate(&record).unwrap_err();
    assert!(matches!(
        err.kind(),
        incident_report::ErrorKind::PageSizeExceeded
    ));
}

#[test]
fn missing_font_falls_back_to_latin() {
    let config = FontConfig::default()
        .with_explicit_path("/nonexistent/font.ttf")
        .with_bundled_paths(Vec::new());
    let font = FontResolver::new(config).resolve(&EmptyEnvironment);
    assert_eq!(font.tier(), ResolutionTier::LatinOnly);

    let document = ReportGenerator::new(font).generate(&sample_record()).unwrap();
    assert!(lopdf::Document::load_mem(document.as_bytes()).is_ok());
}

#[test]
fn generate_with_host_fonts() {
    let bytes =
        incident_report::generate(&sample_record(), Some(Path::new("/nonexistent/font.ttf")))
            .unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn concurrent_generation_shares_font() {
    let generator = heisei_generator();
    let expected = generator.generate(&sample_record()).unwrap().into_bytes();
    thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| generator.generate(&sample_record()).unwrap().into_bytes()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn save_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let record = sample_record();
    let path = dir.path().join(record.suggested_filename());
    let document = heisei_generator().generate(&record).unwrap();
    document.save(&path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), document.as_bytes());

    let err = document.save(dir.path().join("missing").join("report.pdf")).unwrap_err();
    assert!(matches!(err.kind(), incident_report::ErrorKind::IoError(_)));
}

#[test]
fn drafted_sections_are_rendered() {
    let mut record = ReportRecord {
        facility_name: "テスト事業所".to_owned(),
        ..ReportRecord::default()
    };
    DraftSections::template("ボール遊び").apply_to(&mut record);
    let plan = heisei_generator().plan(&record).unwrap();
    assert_eq!(
        plan.rows[0].lines.concat(),
        "ボール遊びの状況において、事故が発生しました。"
    );
}
