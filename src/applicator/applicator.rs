use tracing::{debug, info, warn};

use crate::{
    applicator::{
        interaction,
        locator::{Target, resolve_target},
        outcome::{ApplyAllReport, FillOutcome, ValueOutcome},
        question_form::apply_question_value,
    },
    cli::config::{AppConfig, TimingConfig},
    component::ComponentStrategy,
    dom::{Document, EventKind, NodeId},
    error::FillError,
    field::{
        field_model::{InteractionHint, StructuralPattern},
        suggestion::{NestedSection, SuggestedValue, Suggestion},
    },
    patterns::{array::find_add_control, trigger::find_trigger},
    reconciler::PageState,
    timing::Pacer,
};

/// Applies suggestions against one live document and its page state.
pub struct Applicator<'a> {
    doc: &'a mut Document,
    state: &'a mut PageState,
    pacer: &'a dyn Pacer,
    config: &'a AppConfig,
}

impl<'a> Applicator<'a> {
    pub fn new(
        doc: &'a mut Document,
        state: &'a mut PageState,
        pacer: &'a dyn Pacer,
        config: &'a AppConfig,
    ) -> Self {
        Applicator {
            doc,
            state,
            pacer,
            config,
        }
    }

    fn timing(&self) -> &TimingConfig {
        &self.config.timing
    }

    fn settle(&self, ms: u64) {
        self.pacer.settle(TimingConfig::ms(ms));
    }

    /// Apply one suggestion. Unresolved targets are queued as pending when
    /// `allow_retry` is set.
    pub fn apply(&mut self, suggestion: &Suggestion, allow_retry: bool) -> FillOutcome {
        let outcome = self.fill(suggestion, allow_retry);
        info!(
            identifier = %suggestion.identifier,
            pattern = %suggestion.pattern,
            hint = %suggestion.hint,
            success = outcome.success,
            pending = outcome.pending,
            "suggestion applied"
        );
        outcome
    }

    pub fn apply_value(
        &mut self,
        identifier: &str,
        value: &SuggestedValue,
        pattern: StructuralPattern,
        hint: InteractionHint,
        allow_retry: bool,
    ) -> FillOutcome {
        let suggestion = Suggestion::new(identifier, value.clone()).pattern(pattern).hint(hint);
        self.apply(&suggestion, allow_retry)
    }

    /// Apply every suggestion in order, settling between items. Failures never
    /// stop the remaining items.
    pub fn apply_all(&mut self, suggestions: &[Suggestion], allow_retry: bool) -> ApplyAllReport {
        let mut results = Vec::with_capacity(suggestions.len());
        for (i, suggestion) in suggestions.iter().enumerate() {
            if i > 0 {
                self.settle(self.timing().item_ms);
            }
            results.push(self.apply(suggestion, allow_retry));
        }

        let report = ApplyAllReport::from_results(results);
        info!(
            total = report.summary.total,
            succeeded = report.summary.succeeded,
            failed = report.summary.failed,
            "suggestions applied"
        );
        report
    }

    fn fill(&mut self, suggestion: &Suggestion, allow_retry: bool) -> FillOutcome {
        let identifier = suggestion.identifier.as_str();
        let value = &suggestion.value;

        if suggestion.hint == InteractionHint::QuestionForm {
            return self.fill_question(identifier, value);
        }

        match (suggestion.pattern, value) {
            (StructuralPattern::NestedArray, SuggestedValue::List(items)) => {
                return self.fill_sections(identifier, items);
            }
            (StructuralPattern::NestedArray, _) => {
                return self.mismatch(identifier, suggestion.pattern, value);
            }
            (StructuralPattern::Array, SuggestedValue::Section(_)) => {
                return self.mismatch(identifier, suggestion.pattern, value);
            }
            (_, SuggestedValue::Section(section)) => {
                let mut outcome = self.fill_section(section);
                outcome.field = identifier.to_string();
                return outcome;
            }
            (_, SuggestedValue::List(_)) if value.contains_section() => {
                return self.mismatch(identifier, suggestion.pattern, value);
            }
            _ => {}
        }

        if identifier.trim().is_empty() {
            warn!("suggestion without identifier");
            return FillOutcome::failed(identifier, FillError::IdentifierMissing);
        }

        let Some(target) = resolve_target(self.doc, &self.state.index, identifier, suggestion.hint) else {
            if allow_retry {
                warn!(identifier, "field not found, keeping suggestion pending");
                self.state.pending.insert(suggestion.clone());
                return FillOutcome::deferred(identifier);
            }
            warn!(identifier, "field not found");
            return FillOutcome::failed(
                identifier,
                FillError::TargetNotFound {
                    field: identifier.to_string(),
                },
            );
        };

        if self.is_unwritable(target) {
            warn!(identifier, "field is disabled or read-only");
            return FillOutcome::failed(
                identifier,
                FillError::TargetUnwritable {
                    field: identifier.to_string(),
                },
            )
            .shadow_scope(target.is_encapsulated());
        }

        self.settle(self.timing().scroll_ms);

        let outcome = if suggestion.pattern == StructuralPattern::Array {
            self.fill_array(identifier, target, value)
        } else {
            self.fill_simple(identifier, target, value)
        };
        outcome.shadow_scope(target.is_encapsulated())
    }

    fn mismatch(&self, identifier: &str, pattern: StructuralPattern, value: &SuggestedValue) -> FillOutcome {
        warn!(identifier, %pattern, shape = value.shape(), "value shape does not fit pattern");
        FillOutcome::failed(
            identifier,
            FillError::StructuralMismatch {
                pattern,
                shape: value.shape().to_string(),
            },
        )
    }

    fn is_unwritable(&self, target: Target) -> bool {
        [target.surface(), target.anchor()].iter().any(|node| {
            self.doc
                .element(*node)
                .is_some_and(|el| el.is_disabled() || el.is_read_only())
        })
    }

    fn highlight(&mut self, node: NodeId) {
        let expires_at = self.pacer.now_ms() + self.timing().highlight_ms;
        self.state.highlights.mark(self.doc, node, expires_at);
    }

    // =========================================================================
    // Question-form pages
    // =========================================================================

    fn fill_question(&mut self, identifier: &str, value: &SuggestedValue) -> FillOutcome {
        if identifier.trim().is_empty() {
            return FillOutcome::failed(identifier, FillError::IdentifierMissing);
        }
        match apply_question_value(self.doc, self.pacer, &self.config.timing, identifier, value) {
            Ok(node) => {
                self.highlight(node);
                FillOutcome::filled(identifier)
            }
            Err(e) => FillOutcome::failed(identifier, e),
        }
    }

    // =========================================================================
    // Nested sections
    // =========================================================================

    fn fill_sections(&mut self, identifier: &str, items: &[SuggestedValue]) -> FillOutcome {
        let sections: Vec<FillOutcome> = items
            .iter()
            .map(|item| match item {
                SuggestedValue::Section(section) => self.fill_section(section),
                other => self.mismatch(identifier, StructuralPattern::NestedArray, other),
            })
            .collect();

        let filled = sections.iter().filter(|s| s.success).count();
        let message = format!("Filled {}/{} nested sections", filled, items.len());
        let mut outcome = if filled > 0 {
            FillOutcome::filled(identifier)
        } else {
            FillOutcome {
                success: false,
                ..FillOutcome::filled(identifier)
            }
        };
        outcome.sections = sections;
        outcome.message(message)
    }

    /// Activate the section's trigger, then fill its fields as simple/direct.
    fn fill_section(&mut self, section: &NestedSection) -> FillOutcome {
        if !section.trigger.is_empty() {
            if let Err(e) = self.activate_trigger(&section.trigger) {
                warn!(trigger = %section.trigger, "section aborted");
                return FillOutcome::failed(&section.trigger, e);
            }
        }

        let results: Vec<FillOutcome> = section
            .fields
            .iter()
            .map(|(id, value)| {
                self.apply_value(id, value, StructuralPattern::Simple, InteractionHint::Direct, true)
            })
            .collect();

        let filled = results.iter().filter(|r| r.success).count();
        let message = format!("Filled {}/{} fields in section", filled, results.len());
        let mut outcome = FillOutcome::filled(&section.trigger);
        outcome.success = filled > 0;
        outcome.sections = results;
        outcome.message(message)
    }

    /// Click the trigger, retrying while it is missing or inert.
    fn activate_trigger(&mut self, reference: &str) -> Result<(), FillError> {
        let attempts = self.config.fill.trigger_attempts.max(1);
        for attempt in 1..=attempts {
            match find_trigger(self.doc, reference) {
                Some(button) => {
                    self.settle(self.timing().scroll_ms);
                    if self.doc.click(button) {
                        debug!(trigger = reference, attempt, "trigger activated");
                        self.settle(self.timing().trigger_reveal_ms);
                        return Ok(());
                    }
                    warn!(trigger = reference, attempt, "trigger did not activate");
                }
                None => warn!(trigger = reference, attempt, "trigger not found"),
            }
            if attempt < attempts {
                self.settle(self.timing().trigger_retry_ms);
            }
        }
        Err(FillError::TriggerActivationFailed {
            trigger: reference.to_string(),
            attempts,
        })
    }

    // =========================================================================
    // Array fields
    // =========================================================================

    fn fill_array(&mut self, identifier: &str, target: Target, value: &SuggestedValue) -> FillOutcome {
        let add_control = find_add_control(self.doc, target.anchor(), &self.config.detection);
        if add_control.is_none() {
            debug!(identifier, "no add control, committing with Enter");
        }

        let strategy = self.component_strategy(target);
        let items = value.items();
        let mut values = Vec::with_capacity(items.len());

        for item in &items {
            let Some(text) = item.as_text() else {
                values.push(ValueOutcome {
                    value: String::new(),
                    success: false,
                    error: Some(FillError::StructuralMismatch {
                        pattern: StructuralPattern::Array,
                        shape: item.shape().to_string(),
                    }),
                });
                continue;
            };

            match target {
                Target::Plain(node) => {
                    self.doc.focus(node);
                    self.settle(self.timing().focus_ms);
                    self.doc.set_value(node, &text);
                    self.doc.dispatch(node, EventKind::Input, false);
                    self.doc.dispatch(node, EventKind::Change, false);
                    self.settle(self.timing().value_settle_ms);
                }
                Target::Encapsulated { component, input } => {
                    interaction::write_encapsulated(
                        self.doc,
                        self.pacer,
                        &self.config.timing,
                        component,
                        input,
                        strategy.as_ref(),
                        &text,
                    );
                }
            }
            let committed = interaction::commit_entry(
                self.doc,
                self.pacer,
                &self.config.timing,
                add_control,
                target.surface(),
            );
            if committed {
                debug!(identifier, value = %text, "array value committed");
                values.push(ValueOutcome {
                    value: text,
                    success: true,
                    error: None,
                });
            } else {
                warn!(identifier, value = %text, "add control refused the value");
                values.push(ValueOutcome {
                    value: text,
                    success: false,
                    error: Some(FillError::TargetUnwritable {
                        field: identifier.to_string(),
                    }),
                });
            }
        }

        let added = values.iter().filter(|v| v.success).count();
        self.highlight(target.anchor());

        let mut outcome = FillOutcome::filled(identifier);
        outcome.success = added > 0;
        outcome.values = values;
        outcome.message(format!("Added {}/{} values", added, items.len()))
    }

    // =========================================================================
    // Simple fields
    // =========================================================================

    fn component_strategy(&mut self, target: Target) -> Option<ComponentStrategy> {
        match target {
            Target::Encapsulated { component, .. } => {
                self.state.strategies.resolve(self.doc, component).cloned()
            }
            Target::Plain(_) => None,
        }
    }

    fn fill_simple(&mut self, identifier: &str, target: Target, value: &SuggestedValue) -> FillOutcome {
        let text = value.as_text().unwrap_or_default();

        let written = match target {
            Target::Encapsulated { component, input } => {
                let strategy = self.component_strategy(target);
                interaction::write_encapsulated(
                    self.doc,
                    self.pacer,
                    &self.config.timing,
                    component,
                    input,
                    strategy.as_ref(),
                    &text,
                );
                Ok(())
            }
            Target::Plain(node) => self.write_native(identifier, node, value, &text),
        };

        match written {
            Ok(()) => {
                self.highlight(target.anchor());
                FillOutcome::filled(identifier)
            }
            Err(e) => {
                warn!(identifier, error = %e, "field not filled");
                FillOutcome::failed(identifier, e)
            }
        }
    }

    /// Native controls: checkboxes by truthiness, radios and selects by
    /// option, everything else by value assignment.
    fn write_native(
        &mut self,
        identifier: &str,
        node: NodeId,
        value: &SuggestedValue,
        text: &str,
    ) -> Result<(), FillError> {
        let input_type = self
            .doc
            .element(node)
            .map(|el| el.input_type())
            .unwrap_or_default();
        let timing = &self.config.timing;

        match input_type.as_str() {
            "checkbox" => {
                interaction::set_checkbox(self.doc, self.pacer, timing, node, value.is_truthy());
                Ok(())
            }
            "radio" => interaction::select_radio(self.doc, self.pacer, timing, identifier, node, text),
            "select-one" | "select-multiple" => {
                interaction::select_option(self.doc, self.pacer, timing, identifier, node, text)
            }
            _ => {
                interaction::write_plain(self.doc, self.pacer, timing, node, text);
                Ok(())
            }
        }
    }
}
