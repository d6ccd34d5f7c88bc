use serde::{Deserialize, Serialize};

/// The applicant side of an application, as entered in the profile form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantProfile {
    pub full_name: String,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub education: Option<String>,
}

/// The job being applied to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub description: String,
}

/// Applicant + job, sent with every generation request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationContext {
    pub applicant: ApplicantProfile,
    pub job: JobPosting,
}

impl ApplicationContext {
    /// Plain-text summary embedded in prompts.
    pub fn summary(&self) -> String {
        let applicant = &self.applicant;
        let mut out = format!("APPLICANT: {}\n", applicant.full_name);
        if let Some(headline) = &applicant.headline {
            out.push_str(&format!("Headline: {headline}\n"));
        }
        if !applicant.skills.is_empty() {
            out.push_str(&format!("Skills: {}\n", applicant.skills.join(", ")));
        }
        if !applicant.experience.is_empty() {
            out.push_str(&format!("Experience:\n{}\n", applicant.experience));
        }
        if let Some(education) = &applicant.education {
            out.push_str(&format!("Education: {education}\n"));
        }
        out.push_str(&format!(
            "\nJOB: {} at {}\n",
            self.job.title, self.job.company
        ));
        if !self.job.description.is_empty() {
            out.push_str(&format!("Description:\n{}\n", self.job.description));
        }
        out
    }

    pub fn is_complete(&self) -> bool {
        !self.applicant.full_name.trim().is_empty()
            && !self.job.title.trim().is_empty()
            && !self.job.company.trim().is_empty()
    }
}
