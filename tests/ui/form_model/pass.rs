use morfi::form::{FieldLens, FormModel, HasFieldPath};

#[derive(Clone, PartialEq, morfi::form::FormModel)]
struct SignupForm {
    email: String,
    r#type: u8,
}

fn main() {
    let fields = SignupForm::fields();
    let lens = fields.email();
    let mut model = SignupForm {
        email: "a@morfi.dev".to_string(),
        r#type: 0,
    };
    lens.set(&mut model, "b@morfi.dev".to_string());
    assert_eq!(lens.path().as_str(), "email");
    assert_eq!(lens.get(&model), "b@morfi.dev");
    assert_eq!(fields.r#type().path().as_str(), "type");
    assert!(fields.path().is_root());
}
