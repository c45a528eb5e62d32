use crate::model::{BusinessProfile, ProfileField, AI_TO_ANSWER};

/// Static instructions placed at the top of every generation prompt.
pub const FRAMEWORK_INSTRUCTIONS: &str = r#"
You are MobiusPrime, a world-class deep-research psychological marketing analyst and AI teammate.
Your core operational frameworks are based on the methodologies of:
1. Seth Godin (Branding, Tribes, Purple Cow, Permission Marketing)
2. Gary Vaynerchuk (Social Media, Jab Jab Jab Right Hook, Document Don't Create)
3. Kieran Flanagan (Growth, SEO, User Acquisition, Traffic)
4. Karma Kitchen Philosophy (The 4 C's: Community, Context, Conditions, Commitment + Consensus)

**YOUR TASK:**
Based on the user inputs, generate the requested marketing asset (Personas, Playbook, or Content Calendar).

**GUIDING PRINCIPLES:**
- **Seth Godin:** Focus on the "smallest viable audience", being "remarkable" (Purple Cow), and storytelling. Avoid generic best practices. Focus on connection and "tribes".
- **Gary Vaynerchuk:** Focus on underpriced attention, platform-native content, authenticity, and volume. "Document, don't create."
- **Kieran Flanagan:** Focus on scalable traffic channels, freemium models, SEO, and product-led growth where applicable.
- **Karma Kitchen (4 C's):**
    - *Community:* Build relationships, not just lists.
    - *Context:* The environment (digital or physical) dictates the feeling. Love/Generosity over transaction.
    - *Conditions:* Respect timing and market readiness.
    - *Commitment:* Deep dedication to the customer's transformation, not just the sale.

**INSTRUCTIONS FOR "AI TO ANSWER":**
If the user provides "AI to answer" or leaves a field blank, you MUST infer the best possible answer based on the other provided data and your knowledge of the industry.

**TONE:**
Professional, insightful, slightly counter-intuitive (avoiding cliché), inspiring, and highly actionable.

**FORMATTING:**
Use Markdown. Use bolding for emphasis. Use tables where appropriate (especially for calendars).
"#;

fn field_value(profile: &BusinessProfile, field: ProfileField) -> &str {
    let v = profile.get(field);
    if v.trim().is_empty() { AI_TO_ANSWER } else { v }
}

fn profile_block(profile: &BusinessProfile) -> String {
    let mut s = String::new();
    for (i, field) in ProfileField::ALL.iter().enumerate() {
        s.push_str(&format!(
            "{}. **{}:** {}\n",
            i + 1,
            field.prompt_label(),
            field_value(profile, *field)
        ));
    }
    s
}

/// Assemble the one-shot generation prompt.
///
/// The requested output kind is named twice, in the header and in the
/// closing line. Blank fields are replaced by [`AI_TO_ANSWER`].
pub fn build_prompt(instructions: &str, profile: &BusinessProfile) -> String {
    format!(
"{instructions}

**REQUEST TYPE:** {kind}

**BUSINESS PROFILE:**
{profile}
Generate the {kind} now.
",
instructions = instructions.trim_end(),
kind = profile.selected_output,
profile = profile_block(profile),
)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OutputKind;

    fn acme() -> BusinessProfile {
        BusinessProfile {
            business_name: "Acme".into(),
            selected_output: OutputKind::Personas,
            ..Default::default()
        }
    }

    #[test]
    fn acme_personas_scenario() {
        let p = build_prompt(FRAMEWORK_INSTRUCTIONS, &acme());
        assert!(p.contains("1. **Business Name:** Acme"));
        assert!(p.contains("2. **Industry/Type:** AI to answer"));
        assert!(p.contains("3. **Products/Services:** AI to answer"));
        assert!(p.contains("9. **Marketing Details:** AI to answer"));
        assert!(p.contains("**REQUEST TYPE:** Personas"));
        assert!(p.contains("Generate the Personas now."));
        assert!(p.matches("Personas").count() >= 2);
    }

    #[test]
    fn every_filled_field_appears_verbatim() {
        let mut profile = BusinessProfile::default();
        for f in ProfileField::ALL {
            profile.set(f, format!("<{}>", f.prompt_label()));
        }
        let p = build_prompt("INSTR", &profile);
        for f in ProfileField::ALL {
            assert!(p.contains(&format!("**{}:** <{}>", f.prompt_label(), f.prompt_label())));
        }
        assert!(!p.contains(AI_TO_ANSWER));
    }

    #[test]
    fn whitespace_only_counts_as_empty() {
        let mut profile = acme();
        profile.goals = "   ".into();
        let p = build_prompt("INSTR", &profile);
        assert!(p.contains("6. **Business Goals:** AI to answer"));
    }

    #[test]
    fn sentinel_value_passes_through() {
        let mut profile = acme();
        profile.use_ai_to_answer(ProfileField::Usp);
        let p = build_prompt("INSTR", &profile);
        assert!(p.contains("8. **Unique Selling Proposition:** AI to answer"));
    }

    #[test]
    fn output_kind_named_at_least_twice_for_every_kind() {
        for kind in OutputKind::ALL {
            let profile = BusinessProfile { selected_output: kind, ..Default::default() };
            let p = build_prompt("INSTR", &profile);
            assert!(p.matches(kind.as_str()).count() >= 2, "{kind}");
        }
    }

    #[test]
    fn instructions_lead_the_prompt() {
        let p = build_prompt("SYSTEM RULES", &acme());
        assert!(p.starts_with("SYSTEM RULES"));
        let header = p.find("**REQUEST TYPE:**").unwrap();
        let profile = p.find("**BUSINESS PROFILE:**").unwrap();
        let closing = p.find("Generate the").unwrap();
        assert!(header < profile && profile < closing);
    }

    #[test]
    fn build_is_deterministic() {
        let profile = acme();
        assert_eq!(
            build_prompt(FRAMEWORK_INSTRUCTIONS, &profile),
            build_prompt(FRAMEWORK_INSTRUCTIONS, &profile)
        );
    }
}
