use gatewire_storage::snapshot::{AliasRow, ModelRow, RemapRuleRow};

use crate::glob;

/// Output of full resolution: either a remap rule fired and named both the
/// target model and target provider directly, or nothing matched and the
/// caller (the Router) must apply its own provider-priority fallback to the
/// resolved model name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Remapped {
        model_name: String,
        provider_id: i64,
    },
    Unmapped {
        model_name: String,
    },
}

/// Resolves `(client_id?, requested_model)` against the catalog's aliases
/// and remap rules. Aliases are resolved first and are one-hop only: the
/// substituted name is never re-fed through alias resolution. Remap rules
/// are then matched against whatever name resolution produced.
pub struct ModelResolver<'a> {
    aliases: &'a [AliasRow],
    remap_rules: &'a [RemapRuleRow],
    models: &'a [ModelRow],
}

impl<'a> ModelResolver<'a> {
    pub fn new(
        aliases: &'a [AliasRow],
        remap_rules: &'a [RemapRuleRow],
        models: &'a [ModelRow],
    ) -> Self {
        Self {
            aliases,
            remap_rules,
            models,
        }
    }

    /// Step 1: a client-scoped alias shadows a global alias of the same
    /// name. Returns the canonical model name the alias points at, which
    /// replaces `requested_model` for the remaining steps.
    fn resolve_alias(&self, client_id: Option<i64>, requested_model: &str) -> Option<&'a str> {
        let model_id = if let Some(client_id) = client_id
            && let Some(alias) = self
                .aliases
                .iter()
                .find(|a| a.name == requested_model && a.client_id == Some(client_id))
        {
            Some(alias.model_id)
        } else {
            self.aliases
                .iter()
                .find(|a| a.name == requested_model && a.client_id.is_none())
                .map(|a| a.model_id)
        }?;
        self.models
            .iter()
            .find(|m| m.id == model_id)
            .map(|m| m.name.as_str())
    }

    /// Step 2: the first enabled remap rule (for this client, ordered by
    /// `priority DESC, id ASC`) whose glob matches `requested_model`. The
    /// rule's output is returned as-is; it is never re-matched.
    fn resolve_remap(&self, client_id: i64, requested_model: &str) -> Option<&'a RemapRuleRow> {
        let mut candidates: Vec<&RemapRuleRow> = self
            .remap_rules
            .iter()
            .filter(|r| r.client_id == client_id && r.enabled)
            .collect();
        candidates.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)));
        candidates
            .into_iter()
            .find(|r| glob::matches(&r.from_model, requested_model))
    }

    /// Runs the full three-step algorithm described in the spec: alias
    /// substitution, then remap matching, then fall through to the caller's
    /// own provider-priority policy.
    pub fn resolve(&self, client_id: Option<i64>, requested_model: &str) -> Resolution {
        let working_name = self
            .resolve_alias(client_id, requested_model)
            .unwrap_or(requested_model);

        if let Some(client_id) = client_id
            && let Some(rule) = self.resolve_remap(client_id, working_name)
        {
            return Resolution::Remapped {
                model_name: rule.to_model.clone(),
                provider_id: rule.to_provider,
            };
        }

        Resolution::Unmapped {
            model_name: working_name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatewire_storage::snapshot::{AliasRow, ModelRow, RemapRuleRow};

    fn alias(name: &str, model_id: i64, client_id: Option<i64>) -> AliasRow {
        AliasRow {
            id: 0,
            name: name.to_string(),
            model_id,
            client_id,
            scope_key: client_id
                .map(|c| c.to_string())
                .unwrap_or_else(|| "*".to_string()),
        }
    }

    fn model(id: i64, name: &str) -> ModelRow {
        ModelRow {
            id,
            family_id: 1,
            name: name.to_string(),
            context_window: None,
            max_tokens: None,
            status: "online".to_string(),
            cost_in_per_million: None,
            cost_out_per_million: None,
            cost_reasoning_per_million: None,
            capabilities: None,
        }
    }

    fn rule(
        id: i64,
        client_id: i64,
        from_model: &str,
        to_model: &str,
        to_provider: i64,
        priority: i64,
        enabled: bool,
    ) -> RemapRuleRow {
        RemapRuleRow {
            id,
            client_id,
            from_model: from_model.to_string(),
            to_model: to_model.to_string(),
            to_provider,
            priority,
            enabled,
        }
    }

    #[test]
    fn client_scoped_alias_shadows_global() {
        let models = vec![model(1, "global-fast"), model(2, "client-fast")];
        let aliases = vec![alias("fast", 1, None), alias("fast", 2, Some(10))];
        let resolver = ModelResolver::new(&aliases, &[], &models);
        assert_eq!(
            resolver.resolve(Some(10), "fast"),
            Resolution::Unmapped {
                model_name: "client-fast".to_string()
            }
        );
        assert_eq!(
            resolver.resolve(Some(99), "fast"),
            Resolution::Unmapped {
                model_name: "global-fast".to_string()
            }
        );
    }

    #[test]
    fn unmatched_alias_passes_requested_name_through() {
        let aliases = vec![alias("fast", 1, None)];
        let resolver = ModelResolver::new(&aliases, &[], &[]);
        assert_eq!(
            resolver.resolve(None, "slow"),
            Resolution::Unmapped {
                model_name: "slow".to_string()
            }
        );
    }

    #[test]
    fn remap_ties_broken_by_id_ascending() {
        let rules = vec![
            rule(2, 1, "gpt-*", "gpt-4o", 7, 5, true),
            rule(1, 1, "gpt-*", "gpt-4o-mini", 7, 5, true),
        ];
        let resolver = ModelResolver::new(&[], &rules, &[]);
        assert_eq!(
            resolver.resolve(Some(1), "gpt-4"),
            Resolution::Remapped {
                model_name: "gpt-4o-mini".to_string(),
                provider_id: 7,
            }
        );
    }

    #[test]
    fn remap_prefers_higher_priority() {
        let rules = vec![
            rule(1, 1, "*", "catch-all", 1, 1, true),
            rule(2, 1, "gpt-*", "gpt-4o", 7, 10, true),
        ];
        let resolver = ModelResolver::new(&[], &rules, &[]);
        assert_eq!(
            resolver.resolve(Some(1), "gpt-4"),
            Resolution::Remapped {
                model_name: "gpt-4o".to_string(),
                provider_id: 7,
            }
        );
    }

    #[test]
    fn disabled_remap_is_never_visited() {
        let rules = vec![rule(1, 1, "*", "x", 1, 10, false)];
        let resolver = ModelResolver::new(&[], &rules, &[]);
        assert_eq!(
            resolver.resolve(Some(1), "anything"),
            Resolution::Unmapped {
                model_name: "anything".to_string()
            }
        );
    }

    #[test]
    fn remap_scoped_to_client() {
        let rules = vec![rule(1, 1, "*", "x", 1, 10, true)];
        let resolver = ModelResolver::new(&[], &rules, &[]);
        assert_eq!(
            resolver.resolve(Some(2), "anything"),
            Resolution::Unmapped {
                model_name: "anything".to_string()
            }
        );
    }

    #[test]
    fn no_client_id_skips_remap_entirely() {
        let rules = vec![rule(1, 1, "*", "x", 1, 10, true)];
        let resolver = ModelResolver::new(&[], &rules, &[]);
        assert_eq!(
            resolver.resolve(None, "anything"),
            Resolution::Unmapped {
                model_name: "anything".to_string()
            }
        );
    }
}
