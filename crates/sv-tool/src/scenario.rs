use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sv_runtime::RuntimeOptions;
use sv_steps::{
    CharSet, DateParts, FileSpec, Shift, ShiftDirection, StepTable, TextCheck, TimeParts,
};

pub const SCENARIO_SCHEMA_V1: &str = "sv-scenario.v1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub schema_version: String,
    #[serde(default)]
    pub name: String,
    /// Replaces the runner-wide options for this scenario only.
    #[serde(default)]
    pub options: Option<RuntimeOptions>,
    #[serde(default)]
    pub steps: Vec<StepCall>,
    /// Rendered text every listed variable must have once the steps ran.
    #[serde(default)]
    pub expected_variables: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StepCall {
    StoreText {
        text: String,
        name: String,
    },
    StoreMultilineText {
        name: String,
        lines: Vec<String>,
    },
    StoreXmlText {
        name: String,
        xml: String,
    },
    StoreNumber {
        number: String,
        name: String,
    },
    ChangeVariable {
        name: String,
        value: String,
    },
    EmptyVariable {
        name: String,
    },
    DeleteVariable {
        name: String,
    },
    CopyValue {
        from: String,
        to: String,
    },
    CopyText {
        from: String,
        to: String,
    },
    SubstituteVariable {
        name: String,
        template: String,
        to: String,
    },
    StoreSequence {
        name: String,
        table: StepTable,
    },
    StoreTypedSequence {
        kind: String,
        name: String,
        table: StepTable,
    },
    StoreRandomElement {
        collection: String,
        name: String,
    },
    StoreElementAt {
        collection: String,
        index: String,
        name: String,
    },
    SplitIntoSequence {
        name: String,
        separators: String,
        to: String,
    },
    StoreMapping {
        name: String,
        table: StepTable,
    },
    StoreRandomValue {
        mapping: String,
        name: String,
    },
    StoreValueByKey {
        mapping: String,
        key: String,
        name: String,
    },
    AssertText {
        name: String,
        check: TextCheck,
        expected: String,
    },
    AssertNull {
        name: String,
    },
    AssertNotNull {
        name: String,
    },
    AssertEmpty {
        name: String,
    },
    AssertNotEmpty {
        name: String,
    },
    StoreDate {
        date: DateParts,
        #[serde(default)]
        format: Option<String>,
        name: String,
    },
    StoreTime {
        time: TimeParts,
        #[serde(default)]
        format: Option<String>,
        name: String,
    },
    StoreDatetime {
        date: DateParts,
        time: TimeParts,
        #[serde(default)]
        format: Option<String>,
        name: String,
    },
    StoreCurrentDate {
        #[serde(default)]
        format: Option<String>,
        name: String,
    },
    StoreRandomDate {
        #[serde(default)]
        format: Option<String>,
        name: String,
    },
    StoreShiftedDate {
        #[serde(default)]
        shift: Shift,
        direction: ShiftDirection,
        #[serde(default)]
        from: Option<String>,
        #[serde(default)]
        format: Option<String>,
        name: String,
    },
    StoreRandomText {
        charset: CharSet,
        length: usize,
        #[serde(default)]
        prefix: Option<String>,
        #[serde(default)]
        postfix: Option<String>,
        name: String,
    },
    StoreUuid {
        name: String,
    },
    StoreRandomPhone {
        mask: String,
        name: String,
    },
    StoreRandomMonth {
        name: String,
    },
    StoreRandomWeekday {
        name: String,
    },
    StoreRandomEmail {
        provider: String,
        name: String,
    },
    StoreRandomIp {
        name: String,
    },
    StoreRandomUrl {
        name: String,
    },
    CreateFiles {
        files: Vec<FileSpec>,
    },
    AssertFilesExist {
        files: Vec<FileSpec>,
    },
    StoreFileContent {
        path: String,
        name: String,
    },
    WriteVariableToFile {
        name: String,
        path: String,
    },
}

impl StepCall {
    pub fn step_name(&self) -> &'static str {
        match self {
            Self::StoreText { .. } => "storeText",
            Self::StoreMultilineText { .. } => "storeMultilineText",
            Self::StoreXmlText { .. } => "storeXmlText",
            Self::StoreNumber { .. } => "storeNumber",
            Self::ChangeVariable { .. } => "changeVariable",
            Self::EmptyVariable { .. } => "emptyVariable",
            Self::DeleteVariable { .. } => "deleteVariable",
            Self::CopyValue { .. } => "copyValue",
            Self::CopyText { .. } => "copyText",
            Self::SubstituteVariable { .. } => "substituteVariable",
            Self::StoreSequence { .. } => "storeSequence",
            Self::StoreTypedSequence { .. } => "storeTypedSequence",
            Self::StoreRandomElement { .. } => "storeRandomElement",
            Self::StoreElementAt { .. } => "storeElementAt",
            Self::SplitIntoSequence { .. } => "splitIntoSequence",
            Self::StoreMapping { .. } => "storeMapping",
            Self::StoreRandomValue { .. } => "storeRandomValue",
            Self::StoreValueByKey { .. } => "storeValueByKey",
            Self::AssertText { .. } => "assertText",
            Self::AssertNull { .. } => "assertNull",
            Self::AssertNotNull { .. } => "assertNotNull",
            Self::AssertEmpty { .. } => "assertEmpty",
            Self::AssertNotEmpty { .. } => "assertNotEmpty",
            Self::StoreDate { .. } => "storeDate",
            Self::StoreTime { .. } => "storeTime",
            Self::StoreDatetime { .. } => "storeDatetime",
            Self::StoreCurrentDate { .. } => "storeCurrentDate",
            Self::StoreRandomDate { .. } => "storeRandomDate",
            Self::StoreShiftedDate { .. } => "storeShiftedDate",
            Self::StoreRandomText { .. } => "storeRandomText",
            Self::StoreUuid { .. } => "storeUuid",
            Self::StoreRandomPhone { .. } => "storeRandomPhone",
            Self::StoreRandomMonth { .. } => "storeRandomMonth",
            Self::StoreRandomWeekday { .. } => "storeRandomWeekday",
            Self::StoreRandomEmail { .. } => "storeRandomEmail",
            Self::StoreRandomIp { .. } => "storeRandomIp",
            Self::StoreRandomUrl { .. } => "storeRandomUrl",
            Self::CreateFiles { .. } => "createFiles",
            Self::AssertFilesExist { .. } => "assertFilesExist",
            Self::StoreFileContent { .. } => "storeFileContent",
            Self::WriteVariableToFile { .. } => "writeVariableToFile",
        }
    }
}
