use once_cell::sync::Lazy;
use regex::Regex;

use crate::registry::registry_model::GENERIC_BOARD;

/// Application-form URL patterns, most specific first. The generic rows
/// must stay last.
static BOARD_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"boards\.greenhouse\.io/.*/jobs/\d+", "greenhouse"),
        (r"job-boards\.greenhouse\.io/.+", "greenhouse"),
        (r"jobs\.lever\.co/[^/]+/[a-f0-9-]+/apply", "lever"),
        (r"jobs\.lever\.co/[^/]+/[a-f0-9-]+", "lever"),
        (r"myworkdayjobs\.com/.*/job/.*/apply", "workday"),
        (r"myworkdayjobs\.com/.*/job/", "workday"),
        (r"myworkdaysite\.com/.*/apply", "workday"),
        (r"myworkdaysite\.com/.+", "workday"),
        (r"jobs\.ashbyhq\.com/[^/]+/[a-f0-9-]+/application", "ashby"),
        (r"jobs\.ashbyhq\.com/[^/]+/[a-f0-9-]+", "ashby"),
        (r"jobs\.smartrecruiters\.com/[^/]+/\d+", "smartrecruiters"),
        (r"smartrecruiters\.com/.*/apply", "smartrecruiters"),
        (r"\.icims\.com/", "icims"),
        (r"apply\.workable\.com/", "workable"),
        (r"workable\.com/.*/j/", "workable"),
        (r"bamboohr\.com/.*/jobs/view\.php", "bamboohr"),
        (r"jobs\.jobvite\.com/.*/job/", "jobvite"),
        (r"jobvite\.com/.*/apply", "jobvite"),
        (r"/apply\b", GENERIC_BOARD),
        (r"/application/", GENERIC_BOARD),
        (r"/careers/.*apply", GENERIC_BOARD),
    ]
    .into_iter()
    .map(|(source, board)| {
        let pattern =
            Regex::new(&format!("(?i){}", source)).expect("board patterns are valid regexes");
        (pattern, board)
    })
    .collect()
});

/// Which applicant-tracking system serves `url`, if it looks like an
/// application form at all.
pub fn detect_board(url: &str) -> Option<&'static str> {
    BOARD_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(url))
        .map(|(_, board)| *board)
}
