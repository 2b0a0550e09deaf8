//! Drafting the narrative table fields from a short memo.
//!
//! Staff usually write a few words about an incident and let a language model expand them into
//! the formal sections of the report.  This module builds the prompts for such a model and
//! parses its answer.  It does not talk to any service: sending the prompts is up to the
//! caller.
//!
//! The answer must mark every section with a tag on a line of its own:
//!
//! ```text
//! [situation]
//! バランスボールで遊んでいた際に転倒しました。
//! [process]
//! ...
//! ```
//!
//! Answers without tags are rejected instead of guessed.  [`DraftSections::template`][] produces
//! a canned draft that can be used when no model is available.
//!
//! [`DraftSections::template`]: struct.DraftSections.html#method.template

use std::collections::HashMap;

use crate::error::{Error, ErrorKind};
use crate::record::{ReportRecord, TableField};

const DRAFTED_FIELDS: [TableField; 4] = [
    TableField::Situation,
    TableField::Process,
    TableField::Cause,
    TableField::Countermeasure,
];

/// The input of a drafting request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DraftRequest {
    /// The memo written by the staff.
    pub memo: String,
    /// The name of the facility.
    pub facility_name: String,
    /// Where the incident happened.
    pub location: String,
    /// The person concerned.
    pub subject: String,
}

impl DraftRequest {
    /// Creates a request for the header fields of the given record.
    pub fn for_record(memo: impl Into<String>, record: &ReportRecord) -> DraftRequest {
        DraftRequest {
            memo: memo.into(),
            facility_name: record.facility_name.clone(),
            location: record.location.clone(),
            subject: record.subject.clone(),
        }
    }

    /// Returns whether the memo is blank, in which case there is nothing to draft.
    pub fn is_empty(&self) -> bool {
        self.memo.trim().is_empty()
    }

    /// Returns the system prompt that describes the task and the answer format.
    pub fn system_prompt(&self) -> String {
        let mut prompt = String::from(
            "あなたは放課後等デイサービスの経験豊富な管理者です。\n\
             以下のメモから、行政文書として適切な事故報告書を作成してください。\n\
             \n\
             要件：\n\
             - 客観的で事実に基づいた記述\n\
             - 感情的な表現を避ける\n\
             - 5W1H（いつ、どこで、誰が、何を、なぜ、どのように）を明確に\n\
             - 箇条書きではなく、文章形式で記述\n\
             - 各セクションは2-3文程度で簡潔に記述\n\
             \n\
             次の4つのセクションに分け、各セクションの先頭に角括弧のタグだけを書いた行を置いてください。\n\
             タグ以外の見出しや前置きは書かないでください。回答の形式：\n\
             \n",
        );
        for field in DRAFTED_FIELDS.iter() {
            if let Some(tag) = field.draft_tag() {
                prompt.push_str(&format!("[{}]\n（{}：{}）\n", tag, field, section_hint(*field)));
            }
        }
        prompt
    }

    /// Returns the user prompt with the header fields and the memo.
    pub fn user_prompt(&self) -> String {
        format!(
            "【事業所名】{}\n【発生場所】{}\n【対象者】{}\n\n【メモ内容】\n{}\n\n\
             上記のメモから、事故報告書の各セクションを作成してください。",
            self.facility_name, self.location, self.subject, self.memo
        )
    }
}

fn section_hint(field: TableField) -> &'static str {
    match field {
        TableField::Situation => "何が起きたか、具体的な状況",
        TableField::Process => "事故発生後の対応、保護者への連絡など",
        TableField::Cause => "なぜ起きたか、環境要因・人的要因など",
        TableField::Countermeasure => "再発防止策、改善点など",
        TableField::Others => "",
    }
}

/// The drafted narrative sections of a report.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DraftSections {
    /// 事故発生の状況
    pub situation: String,
    /// 経過
    pub process: String,
    /// 事故原因
    pub cause: String,
    /// 対策
    pub countermeasure: String,
}

impl DraftSections {
    /// Parses a tagged answer.
    ///
    /// Every section tag must appear exactly once on a line of its own.  Text before the first
    /// tag, unknown tags and missing or duplicate sections are errors.
    pub fn parse(response: &str) -> Result<DraftSections, Error> {
        let mut sections: HashMap<TableField, Vec<&str>> = HashMap::new();
        let mut current: Option<TableField> = None;

        for line in response.lines() {
            let trimmed = line.trim();
            if let Some(tag) = trimmed.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
                let field = DRAFTED_FIELDS
                    .iter()
                    .copied()
                    .find(|field| field.draft_tag() == Some(tag))
                    .ok_or_else(|| invalid(format!("Unknown section tag [{}]", tag)))?;
                if sections.insert(field, Vec::new()).is_some() {
                    return Err(invalid(format!("Duplicate section tag [{}]", tag)));
                }
                current = Some(field);
            } else if let Some(field) = current {
                if let Some(lines) = sections.get_mut(&field) {
                    lines.push(line);
                }
            } else if !trimmed.is_empty() {
                return Err(invalid("The answer contains text before the first section tag"));
            }
        }

        let mut take = |field: TableField| -> Result<String, Error> {
            let lines = sections.remove(&field).ok_or_else(|| {
                invalid(format!("Missing section tag [{}]", field.draft_tag().unwrap_or("")))
            })?;
            Ok(lines.join("\n").trim().to_owned())
        };
        Ok(DraftSections {
            situation: take(TableField::Situation)?,
            process: take(TableField::Process)?,
            cause: take(TableField::Cause)?,
            countermeasure: take(TableField::Countermeasure)?,
        })
    }

    /// Returns a canned draft for the given memo.
    ///
    /// A blank memo yields empty sections.
    pub fn template(memo: &str) -> DraftSections {
        let memo = memo.trim();
        if memo.is_empty() {
            return DraftSections::default();
        }
        DraftSections {
            situation: format!("{}の状況において、事故が発生しました。", memo),
            process: "直ちに職員が駆けつけ、状況を確認しました。保護者への連絡を実施しました。"
                .to_owned(),
            cause: "環境要因および人的要因が重なったことが原因と考えられます。".to_owned(),
            countermeasure: "再発防止策として、環境の整備と職員の研修を実施します。".to_owned(),
        }
    }

    /// Returns the section for the given table field, or `None` for fields that are not drafted.
    pub fn get(&self, field: TableField) -> Option<&str> {
        match field {
            TableField::Situation => Some(&self.situation),
            TableField::Process => Some(&self.process),
            TableField::Cause => Some(&self.cause),
            TableField::Countermeasure => Some(&self.countermeasure),
            TableField::Others => None,
        }
    }

    /// Copies the sections into the given record, overwriting its narrative fields.
    pub fn apply_to(&self, record: &mut ReportRecord) {
        record.situation = self.situation.clone();
        record.process = self.process.clone();
        record.cause = self.cause.clone();
        record.countermeasure = self.countermeasure.clone();
    }
}

fn invalid(msg: impl Into<String>) -> Error {
    Error::new(msg, ErrorKind::InvalidData)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANSWER: &str = "[situation]\n\
        プレイルームでバランスボールに乗っていた際に転倒しました。\n\
        [process]\n\
        職員が患部を冷やし、保護者に連絡しました。\n\
        帰宅時に状況を説明しました。\n\
        \n\
        [cause]\n\
        ボールの空気圧が高く、不安定でした。\n\
        [countermeasure]\n\
        使用時は職員が必ず補助します。\n";

    #[test]
    fn test_parse_tagged_answer() {
        let sections = DraftSections::parse(ANSWER).unwrap();
        assert_eq!(
            sections.situation,
            "プレイルームでバランスボールに乗っていた際に転倒しました。"
        );
        assert_eq!(
            sections.process,
            "職員が患部を冷やし、保護者に連絡しました。\n帰宅時に状況を説明しました。"
        );
        assert_eq!(sections.countermeasure, "使用時は職員が必ず補助します。");
        assert_eq!(sections.get(TableField::Others), None);
    }

    #[test]
    fn test_parse_rejects_untagged_answers() {
        let err = DraftSections::parse("1. 事故発生の状況：転倒しました。").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidData));
    }

    #[test]
    fn test_parse_rejects_bad_tags() {
        let unknown = format!("{}[others]\nなし\n", ANSWER);
        assert!(DraftSections::parse(&unknown).is_err());

        let duplicate = format!("{}[cause]\n再掲\n", ANSWER);
        assert!(DraftSections::parse(&duplicate).is_err());

        let missing = ANSWER.replace("[countermeasure]", "");
        let err = DraftSections::parse(&missing).unwrap_err();
        assert!(err.to_string().contains("countermeasure"));
    }

    #[test]
    fn test_template() {
        let sections = DraftSections::template(" 転倒 ");
        assert_eq!(sections.situation, "転倒の状況において、事故が発生しました。");
        assert!(sections.cause.contains("人的要因"));
        assert_eq!(DraftSections::template("   "), DraftSections::default());
    }

    #[test]
    fn test_apply_to_record() {
        let mut record = ReportRecord {
            others: "特になし".to_owned(),
            ..ReportRecord::default()
        };
        DraftSections::parse(ANSWER).unwrap().apply_to(&mut record);
        assert_eq!(record.cause, "ボールの空気圧が高く、不安定でした。");
        assert_eq!(record.others, "特になし");
    }

    #[test]
    fn test_prompts() {
        let record = ReportRecord {
            facility_name: "テスト事業所".to_owned(),
            location: "プレイルーム".to_owned(),
            subject: "山田 太郎".to_owned(),
            ..ReportRecord::default()
        };
        let request = DraftRequest::for_record("ボールで転倒", &record);
        assert!(!request.is_empty());

        let system = request.system_prompt();
        for tag in ["[situation]", "[process]", "[cause]", "[countermeasure]"].iter() {
            assert!(system.contains(tag));
        }
        // the answer format shown in the prompt is accepted by the parser
        let format = &system[system.find("[situation]").unwrap()..];
        let sections = DraftSections::parse(format).unwrap();
        assert_eq!(sections.situation, "（事故発生の状況：何が起きたか、具体的な状況）");
        assert_eq!(sections.countermeasure, "（対策：再発防止策、改善点など）");

        let user = request.user_prompt();
        assert!(user.contains("【事業所名】テスト事業所"));
        assert!(user.contains("ボールで転倒"));
    }
}
