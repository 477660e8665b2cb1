//! PageSpeed Insights client used by the SEO diagnostic intake.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use super::UpstreamError;

const ENDPOINT: &str = "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

/// The analysis call is the only upstream call with a timeout of its
/// own; everything else rides on the shared client defaults.
const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct PageSpeedClient {
    http: reqwest::Client,
    api_key: String,
}

impl PageSpeedClient {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self { http, api_key }
    }

    /// Run a mobile SEO-category analysis for `url`.
    pub async fn analyze(&self, url: &str) -> Result<PageSpeedReport, UpstreamError> {
        let response = self
            .http
            .get(ENDPOINT)
            .query(&[
                ("url", url),
                ("key", self.api_key.as_str()),
                ("category", "SEO"),
                ("strategy", "mobile"),
            ])
            .timeout(ANALYSIS_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status {
                status: response.status(),
            });
        }

        let body: PageSpeedResponse = response.json().await?;
        Ok(PageSpeedReport { body })
    }
}

// Only the slices of the Lighthouse payload the funnel reads.

#[derive(Debug, Deserialize)]
pub struct PageSpeedResponse {
    #[serde(rename = "lighthouseResult")]
    lighthouse_result: Option<LighthouseResult>,
}

#[derive(Debug, Deserialize)]
struct LighthouseResult {
    categories: Option<Categories>,
    audits: Option<HashMap<String, Audit>>,
}

#[derive(Debug, Deserialize)]
struct Categories {
    seo: Option<CategoryScore>,
}

#[derive(Debug, Deserialize)]
struct CategoryScore {
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Audit {
    score: Option<f64>,
    #[serde(rename = "scoreDisplayMode")]
    score_display_mode: Option<String>,
}

#[derive(Debug)]
pub struct PageSpeedReport {
    body: PageSpeedResponse,
}

impl PageSpeedReport {
    /// Normalized 0-100 SEO score; 0 when the nested field is absent.
    pub fn seo_score(&self) -> f64 {
        self.body
            .lighthouse_result
            .as_ref()
            .and_then(|r| r.categories.as_ref())
            .and_then(|c| c.seo.as_ref())
            .and_then(|s| s.score)
            .map(|s| (s * 100.0).round().clamp(0.0, 100.0))
            .unwrap_or(0.0)
    }

    /// Audits with a non-informative display mode and a sub-maximal
    /// score. Only the count feeds the diagnosis prompt.
    pub fn failing_audit_count(&self) -> usize {
        self.body
            .lighthouse_result
            .as_ref()
            .and_then(|r| r.audits.as_ref())
            .map(|audits| {
                audits
                    .values()
                    .filter(|a| {
                        a.score_display_mode.as_deref() != Some("informative")
                            && a.score.is_some_and(|s| s < 1.0)
                    })
                    .count()
            })
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(json: &str) -> PageSpeedReport {
        PageSpeedReport {
            body: serde_json::from_str(json).unwrap(),
        }
    }

    #[test]
    fn test_seo_score_extracted_and_scaled() {
        let r = report(r#"{"lighthouseResult":{"categories":{"seo":{"score":0.87}}}}"#);
        assert_eq!(r.seo_score(), 87.0);
    }

    #[test]
    fn test_seo_score_defaults_to_zero_when_absent() {
        assert_eq!(report("{}").seo_score(), 0.0);
        assert_eq!(report(r#"{"lighthouseResult":{}}"#).seo_score(), 0.0);
        assert_eq!(
            report(r#"{"lighthouseResult":{"categories":{"seo":{}}}}"#).seo_score(),
            0.0
        );
    }

    #[test]
    fn test_seo_score_stays_within_bounds() {
        let r = report(r#"{"lighthouseResult":{"categories":{"seo":{"score":1.0}}}}"#);
        assert_eq!(r.seo_score(), 100.0);
        let r = report(r#"{"lighthouseResult":{"categories":{"seo":{"score":0.0}}}}"#);
        assert_eq!(r.seo_score(), 0.0);
    }

    #[test]
    fn test_failing_audits_skip_informative_and_perfect() {
        let r = report(
            r#"{"lighthouseResult":{"audits":{
                "a":{"score":0.5,"scoreDisplayMode":"numeric"},
                "b":{"score":1.0,"scoreDisplayMode":"numeric"},
                "c":{"score":0.0,"scoreDisplayMode":"informative"},
                "d":{"scoreDisplayMode":"numeric"},
                "e":{"score":0.3}
            }}}"#,
        );
        // a (sub-maximal) and e (sub-maximal, no display mode) count;
        // b is perfect, c informative, d has no score at all.
        assert_eq!(r.failing_audit_count(), 2);
    }

    #[test]
    fn test_failing_audits_zero_without_audits() {
        assert_eq!(report("{}").failing_audit_count(), 0);
    }
}
