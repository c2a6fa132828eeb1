use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde_json::json;

use crate::assets::AssetSource;
use crate::error_codes::{CodedError, MATCH_FILE_INVALID, MATCH_FILE_UNREADABLE};
use crate::schema::MatchDetails;

/// Loads a match file (YAML, or JSON by extension) and validates it.
/// Relative asset paths are rebased onto the file's directory.
pub fn load_and_validate_match(path: &Path) -> Result<MatchDetails> {
    let contents = fs::read_to_string(path).map_err(|error| {
        anyhow!(CodedError::input(
            MATCH_FILE_UNREADABLE,
            format!("failed to read match file {}: {error}", path.display()),
        )
        .with_details(json!({ "path": path.display().to_string() })))
    })?;

    let mut details = parse_match(&contents, path)?;
    details
        .validate()
        .with_context(|| format!("failed validating match file {}", path.display()))?;

    let base_dir = path
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    rebase_asset_paths(&mut details, &base_dir);
    Ok(details)
}

fn parse_match(contents: &str, path: &Path) -> Result<MatchDetails> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let parsed = if is_json {
        serde_json::from_str::<MatchDetails>(contents)
            .map_err(|error| (format!("line {}, column {}", error.line(), error.column()), error.to_string()))
    } else {
        serde_yaml::from_str::<MatchDetails>(contents).map_err(|error| {
            let location = error
                .location()
                .map(|location| format!("line {}, column {}", location.line(), location.column()))
                .unwrap_or_else(|| "unknown location".to_owned());
            (location, error.to_string())
        })
    };

    parsed.map_err(|(location, message)| {
        anyhow!(CodedError::input(
            MATCH_FILE_INVALID,
            format!("failed to parse {} at {location}: {message}", path.display()),
        )
        .with_details(json!({
            "path": path.display().to_string(),
            "location": location,
        })))
    })
}

fn rebase_asset_paths(details: &mut MatchDetails, base_dir: &Path) {
    for field in [
        &mut details.home_logo,
        &mut details.home_logo_url,
        &mut details.away_logo,
        &mut details.away_logo_url,
        &mut details.custom_background,
        &mut details.background_url,
    ] {
        if let Some(value) = field.as_mut() {
            if let Some(rebased) = rebase_local_path(value, base_dir) {
                *value = rebased;
            }
        }
    }
}

/// Missing files are left for asset resolution to report.
fn rebase_local_path(value: &str, base_dir: &Path) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.to_ascii_lowercase().starts_with("file://") {
        return None;
    }
    match AssetSource::parse(trimmed) {
        Ok(AssetSource::File(path)) if path.is_relative() => {
            let resolved = base_dir.join(path);
            if !resolved.is_file() {
                log::debug!("asset {} does not exist yet", resolved.display());
            }
            Some(resolved.to_string_lossy().into_owned())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::error_codes::{find_coded_error, EMPTY_TEAM_NAME};
    use crate::schema::ManualLayout;

    #[test]
    fn yaml_match_file_loads_with_rebased_paths() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("derby.yaml");
        fs::write(
            &path,
            "homeTeam: Tottenham\nawayTeam: Arsenal\ntournament: Premier League\nlayout: Split Screen\nhomeLogo: logos/thfc.png\nawayLogoUrl: https://cdn.example/afc.png\n",
        )
        .unwrap();

        let details = load_and_validate_match(&path).unwrap();
        assert_eq!(details.layout, ManualLayout::SplitScreen);
        let expected = dir.path().join("logos/thfc.png");
        assert_eq!(details.home_logo.as_deref(), Some(expected.to_str().unwrap()));
        assert_eq!(details.away_logo_url.as_deref(), Some("https://cdn.example/afc.png"));
    }

    #[test]
    fn json_match_file_is_chosen_by_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("final.JSON");
        fs::write(&path, r##"{"homeTeam":"Real Madrid","awayTeam":"FC Barcelona","textColor":"#fde047"}"##).unwrap();
        let details = load_and_validate_match(&path).unwrap();
        assert_eq!(details.away_team, "FC Barcelona");
    }

    #[test]
    fn parse_errors_are_coded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "homeTeam: A\nawayTeam: B\nlayout: diagonal\n").unwrap();
        let error = load_and_validate_match(&path).unwrap_err();
        let coded = find_coded_error(&error).unwrap();
        assert_eq!(coded.code, MATCH_FILE_INVALID);
        assert!(coded.message.contains("diagonal"));
        assert!(coded.details.as_ref().unwrap().get("location").is_some());
    }

    #[test]
    fn empty_team_is_rejected_and_missing_file_is_coded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.yaml");
        fs::write(&path, "homeTeam: ''\nawayTeam: B\n").unwrap();
        let error = load_and_validate_match(&path).unwrap_err();
        assert_eq!(find_coded_error(&error).map(|e| e.code), Some(EMPTY_TEAM_NAME));

        let missing = load_and_validate_match(&dir.path().join("nope.yaml")).unwrap_err();
        assert_eq!(find_coded_error(&missing).map(|e| e.code), Some(MATCH_FILE_UNREADABLE));
    }

    #[test]
    fn data_urls_and_absolute_paths_are_untouched() {
        let base = Path::new("/srv/matches");
        assert_eq!(rebase_local_path("data:image/png;base64,AAAA", base), None);
        assert_eq!(rebase_local_path("/abs/logo.png", base), None);
        assert_eq!(
            rebase_local_path("bg.jpg", base),
            Some("/srv/matches/bg.jpg".to_owned())
        );
    }
}
