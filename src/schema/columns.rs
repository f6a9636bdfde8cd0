//! Known survey columns
//!
//! The risk-factor survey has a fixed layout of 36 columns. Each column is
//! either a numeric measurement (ages, counts, years) or a 0/1 flag.

use serde::{Deserialize, Serialize};

/// Storage kind of a survey column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Free numeric value (age, count, years)
    Numeric,
    /// Indicator restricted to 0 or 1
    Flag,
}

/// A known survey column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    // Demographics and sexual history
    Age,
    SexualPartners,
    FirstIntercourse,
    Pregnancies,

    // Smoking
    Smokes,
    SmokesYears,
    SmokesPacksPerYear,

    // Contraception
    HormonalContraceptives,
    HormonalContraceptivesYears,
    Iud,
    IudYears,

    // Sexually transmitted diseases
    Stds,
    StdsNumber,
    StdCondylomatosis,
    StdCervicalCondylomatosis,
    StdVaginalCondylomatosis,
    StdVulvoPerinealCondylomatosis,
    StdSyphilis,
    StdPelvicInflammatoryDisease,
    StdGenitalHerpes,
    StdMolluscumContagiosum,
    StdAids,
    StdHiv,
    StdHepatitisB,
    StdHpv,
    StdsDiagnosisCount,
    StdsTimeSinceFirstDiagnosis,
    StdsTimeSinceLastDiagnosis,

    // Prior diagnoses
    DxCancer,
    DxCin,
    DxHpv,
    Dx,

    // Screening results
    Hinselmann,
    Schiller,
    Citology,
    Biopsy,
}

impl Column {
    /// Number of known columns
    pub const COUNT: usize = 36;

    /// Every known column, in survey order
    pub const ALL: [Column; Column::COUNT] = [
        Column::Age,
        Column::SexualPartners,
        Column::FirstIntercourse,
        Column::Pregnancies,
        Column::Smokes,
        Column::SmokesYears,
        Column::SmokesPacksPerYear,
        Column::HormonalContraceptives,
        Column::HormonalContraceptivesYears,
        Column::Iud,
        Column::IudYears,
        Column::Stds,
        Column::StdsNumber,
        Column::StdCondylomatosis,
        Column::StdCervicalCondylomatosis,
        Column::StdVaginalCondylomatosis,
        Column::StdVulvoPerinealCondylomatosis,
        Column::StdSyphilis,
        Column::StdPelvicInflammatoryDisease,
        Column::StdGenitalHerpes,
        Column::StdMolluscumContagiosum,
        Column::StdAids,
        Column::StdHiv,
        Column::StdHepatitisB,
        Column::StdHpv,
        Column::StdsDiagnosisCount,
        Column::StdsTimeSinceFirstDiagnosis,
        Column::StdsTimeSinceLastDiagnosis,
        Column::DxCancer,
        Column::DxCin,
        Column::DxHpv,
        Column::Dx,
        Column::Hinselmann,
        Column::Schiller,
        Column::Citology,
        Column::Biopsy,
    ];

    /// Header text as it appears in the source sheet
    pub fn header(&self) -> &'static str {
        match self {
            Column::Age => "Age",
            Column::SexualPartners => "Number of sexual partners",
            Column::FirstIntercourse => "First sexual intercourse",
            Column::Pregnancies => "Num of pregnancies",
            Column::Smokes => "Smokes",
            Column::SmokesYears => "Smokes (years)",
            Column::SmokesPacksPerYear => "Smokes (packs/year)",
            Column::HormonalContraceptives => "Hormonal Contraceptives",
            Column::HormonalContraceptivesYears => "Hormonal Contraceptives (years)",
            Column::Iud => "IUD",
            Column::IudYears => "IUD (years)",
            Column::Stds => "STDs",
            Column::StdsNumber => "STDs (number)",
            Column::StdCondylomatosis => "STDs:condylomatosis",
            Column::StdCervicalCondylomatosis => "STDs:cervical condylomatosis",
            Column::StdVaginalCondylomatosis => "STDs:vaginal condylomatosis",
            Column::StdVulvoPerinealCondylomatosis => "STDs:vulvo-perineal condylomatosis",
            Column::StdSyphilis => "STDs:syphilis",
            Column::StdPelvicInflammatoryDisease => "STDs:pelvic inflammatory disease",
            Column::StdGenitalHerpes => "STDs:genital herpes",
            Column::StdMolluscumContagiosum => "STDs:molluscum contagiosum",
            Column::StdAids => "STDs:AIDS",
            Column::StdHiv => "STDs:HIV",
            Column::StdHepatitisB => "STDs:Hepatitis B",
            Column::StdHpv => "STDs:HPV",
            Column::StdsDiagnosisCount => "STDs: Number of diagnosis",
            Column::StdsTimeSinceFirstDiagnosis => "STDs: Time since first diagnosis",
            Column::StdsTimeSinceLastDiagnosis => "STDs: Time since last diagnosis",
            Column::DxCancer => "Dx:Cancer",
            Column::DxCin => "Dx:CIN",
            Column::DxHpv => "Dx:HPV",
            Column::Dx => "Dx",
            Column::Hinselmann => "Hinselmann",
            Column::Schiller => "Schiller",
            Column::Citology => "Citology",
            Column::Biopsy => "Biopsy",
        }
    }

    /// Whether the column holds a free number or a 0/1 flag
    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Age
            | Column::SexualPartners
            | Column::FirstIntercourse
            | Column::Pregnancies
            | Column::SmokesYears
            | Column::SmokesPacksPerYear
            | Column::HormonalContraceptivesYears
            | Column::IudYears
            | Column::StdsNumber
            | Column::StdsDiagnosisCount
            | Column::StdsTimeSinceFirstDiagnosis
            | Column::StdsTimeSinceLastDiagnosis => ColumnKind::Numeric,
            _ => ColumnKind::Flag,
        }
    }

    /// Position of the column inside a record's value slots
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Look up a column by its exact header text
    pub fn from_header(header: &str) -> Option<Column> {
        Column::ALL.iter().copied().find(|c| c.header() == header)
    }
}
