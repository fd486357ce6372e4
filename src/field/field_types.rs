use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic meaning of an application-form control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    FirstName,
    LastName,
    FullName,
    Email,
    Phone,
    Location,
    Address,
    City,
    State,
    ZipCode,
    Country,
    LinkedinUrl,
    PortfolioUrl,
    WebsiteUrl,
    ResumeUpload,
    CoverLetterUpload,
    CoverLetterText,
    YearsExperience,
    Education,
    Salary,
    StartDate,
    CurrentCompany,
    CurrentTitle,
    WorkAuthorization,
    SponsorshipRequired,
    EeoGender,
    EeoRaceEthnicity,
    EeoVeteranStatus,
    EeoDisabilityStatus,
    CustomQuestion,
    Unknown,
}

/// Coarse grouping handed to the value-mapping stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldCategory {
    Personal,
    Resume,
    Professional,
    Authorization,
    Eeo,
    Custom,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::FirstName => "firstName",
            FieldType::LastName => "lastName",
            FieldType::FullName => "fullName",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Location => "location",
            FieldType::Address => "address",
            FieldType::City => "city",
            FieldType::State => "state",
            FieldType::ZipCode => "zipCode",
            FieldType::Country => "country",
            FieldType::LinkedinUrl => "linkedinUrl",
            FieldType::PortfolioUrl => "portfolioUrl",
            FieldType::WebsiteUrl => "websiteUrl",
            FieldType::ResumeUpload => "resumeUpload",
            FieldType::CoverLetterUpload => "coverLetterUpload",
            FieldType::CoverLetterText => "coverLetterText",
            FieldType::YearsExperience => "yearsExperience",
            FieldType::Education => "education",
            FieldType::Salary => "salary",
            FieldType::StartDate => "startDate",
            FieldType::CurrentCompany => "currentCompany",
            FieldType::CurrentTitle => "currentTitle",
            FieldType::WorkAuthorization => "workAuthorization",
            FieldType::SponsorshipRequired => "sponsorshipRequired",
            FieldType::EeoGender => "eeoGender",
            FieldType::EeoRaceEthnicity => "eeoRaceEthnicity",
            FieldType::EeoVeteranStatus => "eeoVeteranStatus",
            FieldType::EeoDisabilityStatus => "eeoDisabilityStatus",
            FieldType::CustomQuestion => "customQuestion",
            FieldType::Unknown => "unknown",
        }
    }

    /// Static type → category lookup.
    pub fn category(self) -> FieldCategory {
        match self {
            FieldType::FirstName
            | FieldType::LastName
            | FieldType::FullName
            | FieldType::Email
            | FieldType::Phone
            | FieldType::Location
            | FieldType::Address
            | FieldType::City
            | FieldType::State
            | FieldType::ZipCode
            | FieldType::Country
            | FieldType::LinkedinUrl
            | FieldType::PortfolioUrl
            | FieldType::WebsiteUrl => FieldCategory::Personal,

            FieldType::ResumeUpload | FieldType::CoverLetterUpload | FieldType::CoverLetterText => {
                FieldCategory::Resume
            }

            FieldType::YearsExperience
            | FieldType::Education
            | FieldType::Salary
            | FieldType::StartDate
            | FieldType::CurrentCompany
            | FieldType::CurrentTitle => FieldCategory::Professional,

            FieldType::WorkAuthorization | FieldType::SponsorshipRequired => {
                FieldCategory::Authorization
            }

            FieldType::EeoGender
            | FieldType::EeoRaceEthnicity
            | FieldType::EeoVeteranStatus
            | FieldType::EeoDisabilityStatus => FieldCategory::Eeo,

            FieldType::CustomQuestion | FieldType::Unknown => FieldCategory::Custom,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FieldCategory {
    pub const ALL: [FieldCategory; 6] = [
        FieldCategory::Personal,
        FieldCategory::Resume,
        FieldCategory::Professional,
        FieldCategory::Authorization,
        FieldCategory::Eeo,
        FieldCategory::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldCategory::Personal => "personal",
            FieldCategory::Resume => "resume",
            FieldCategory::Professional => "professional",
            FieldCategory::Authorization => "authorization",
            FieldCategory::Eeo => "eeo",
            FieldCategory::Custom => "custom",
        }
    }
}

impl fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
