//! Notification link construction.

/// Link target for a notification about an entity of the given type:
/// tasks land on the task list, projects on the project list, anything
/// else on the app root.
pub fn entity_link(base_url: &str, entity_type: &str) -> String {
    match entity_type {
        "task" => format!("{base_url}/tasks"),
        "project" => format!("{base_url}/projects"),
        _ => base_url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_links_to_task_list() {
        assert_eq!(entity_link("https://app", "task"), "https://app/tasks");
    }

    #[test]
    fn project_links_to_project_list() {
        assert_eq!(entity_link("https://app", "project"), "https://app/projects");
    }

    #[test]
    fn unknown_entity_links_to_base() {
        assert_eq!(entity_link("https://app", "workspace"), "https://app");
    }
}
