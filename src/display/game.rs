//! Game profile display formatting

use crate::config::{GameProfile, GamesConfig, ResolvedProfile};

/// Format the configured games as a table
pub fn format_game_list(config: &GamesConfig) -> String {
    if config.games.is_empty() {
        return "No games configured.".to_string();
    }

    let id_width = config.games.keys().map(|k| k.len()).max().unwrap_or(2).max(2);
    let name_width = config
        .games
        .values()
        .map(|g| g.name.len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<id_width$}  {:<name_width$}  {:>4}  {}\n",
        "ID",
        "Name",
        "Keep",
        "Save Path",
        id_width = id_width,
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<id_width$}  {:-<name_width$}  {:->4}  {:-<9}\n",
        "",
        "",
        "",
        "",
        id_width = id_width,
        name_width = name_width,
    ));

    for (id, game) in &config.games {
        output.push_str(&format!(
            "{:<id_width$}  {:<name_width$}  {:>4}  {}\n",
            id,
            game.name,
            config.keep_count(game),
            game.save_path,
            id_width = id_width,
            name_width = name_width,
        ));
    }

    output
}

/// Format a single game's details
///
/// `resolved` is absent when the profile's paths could not be expanded; the
/// raw values are still shown.
pub fn format_game_details(
    id: &str,
    game: &GameProfile,
    resolved: Option<&ResolvedProfile>,
    snapshot_count: usize,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Game: {} ({})\n", game.name, id));
    output.push_str(&format!("  Save path:   {}\n", game.save_path));
    if let Some(resolved) = resolved {
        if resolved.source_dir.to_string_lossy() != game.save_path {
            output.push_str(&format!("               -> {}\n", resolved.source_dir.display()));
        }
        output.push_str(&format!("  Backups in:  {}\n", resolved.backup_root.display()));
        output.push_str(&format!("  Keep:        {} most recent\n", resolved.keep_count));
    }
    output.push_str(&format!("  Snapshots:   {}\n", snapshot_count));
    if let Some(description) = &game.description {
        output.push_str(&format!("  Description: {}\n", description));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_list() {
        let mut config = GamesConfig::default();
        config
            .add_game("skyrim", GameProfile::new("Skyrim", "/saves/skyrim"))
            .unwrap();

        let output = format_game_list(&config);
        assert!(output.contains("skyrim"));
        assert!(output.contains("Skyrim"));
        assert!(output.contains("/saves/skyrim"));
        assert!(output.contains("10"));
    }

    #[test]
    fn test_empty_game_list() {
        assert_eq!(format_game_list(&GamesConfig::default()), "No games configured.");
    }
}
