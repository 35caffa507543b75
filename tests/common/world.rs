use cucumber::World;
use formline::runtime::models::FormDefinition;
use formline::runtime::services::{MockChallengeWidget, MockTransport};
use formline::runtime::{FormContainer, RuntimeSettings, StructuralError, SubmitOutcome};

pub type TestForm = FormContainer<MockChallengeWidget, MockTransport>;

/// Contact form used by every scenario unless a step replaces it
pub const CONTACT_FORM: &str = r#"{
    "id": "contact",
    "items": [
        {"fieldType": "panel", "id": "details", "items": [
            {"fieldType": "text-input", "id": "name", "required": true},
            {"fieldType": "text-input", "id": "email"}
        ]},
        {"fieldType": "captcha", "id": "captcha", "provider": "hcaptcha", "required": true,
         "cloudConfiguration": {"siteKey": "10000000-ffff-ffff-ffff-000000000001"}},
        {"fieldType": "button", "id": "submit"}
    ]
}"#;

/// Scenario state: collaborator scripts, toggles and the loaded form
#[derive(World)]
#[world(init = Self::new)]
pub struct FormWorld {
    /// Form definition JSON
    pub definition: String,

    /// Enabled feature toggles
    pub toggles: Vec<String>,

    /// Scripted challenge widget; clones share the script
    pub widget: MockChallengeWidget,

    /// Scripted transport; clones share the call log
    pub transport: MockTransport,

    /// Loaded on first use
    form: Option<TestForm>,

    /// Outcome of the last submit
    pub last_outcome: Option<SubmitOutcome>,

    /// Last structural error raised by a step
    pub last_error: Option<StructuralError>,
}

impl std::fmt::Debug for FormWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormWorld")
            .field("toggles", &self.toggles)
            .field("loaded", &self.form.is_some())
            .field("last_outcome", &self.last_outcome)
            .finish()
    }
}

impl FormWorld {
    pub fn new() -> Self {
        Self {
            definition: CONTACT_FORM.to_string(),
            toggles: Vec::new(),
            widget: MockChallengeWidget::succeeding("P1_default-token"),
            transport: MockTransport::new(),
            form: None,
            last_outcome: None,
            last_error: None,
        }
    }

    /// The loaded form; settings are resolved from the toggles at this point
    pub fn form(&mut self) -> &TestForm {
        if self.form.is_none() {
            let definition =
                FormDefinition::from_json(&self.definition).expect("Invalid form definition");
            let settings = RuntimeSettings::resolve(&self.toggles);
            tracing::debug!("Loading form with toggles {:?}", self.toggles);
            let form = FormContainer::build(
                &definition,
                settings,
                self.widget.clone(),
                self.transport.clone(),
            )
            .expect("Failed to build form");
            self.form = Some(form);
        }
        self.form.as_ref().expect("form loaded above")
    }

    pub fn is_loaded(&self) -> bool {
        self.form.is_some()
    }

    /// DOM attribute on the element with id `id`
    pub fn attribute(&mut self, id: &str, name: &str) -> Option<String> {
        let form = self.form();
        let node = form.element_by_id(id)?;
        let document = form.document().borrow();
        let value = document.attribute(node, name).map(str::to_string);
        value
    }

    /// Text of the error region of field `id`
    pub fn error_text(&mut self, id: &str) -> String {
        self.text_of(&format!("{id}-errormessage"))
    }

    pub fn text_of(&mut self, id: &str) -> String {
        let form = self.form();
        let node = form
            .element_by_id(id)
            .unwrap_or_else(|| panic!("No element with id '{id}'"));
        let text = form.document().borrow().text_content(node);
        text
    }
}
