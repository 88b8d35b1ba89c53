use morfi::form::{FieldLens, FormModel, HasFieldPath};

#[derive(Clone, Default, PartialEq, morfi::form::FormModel)]
pub struct Address {
    pub city: String,
}

#[derive(Clone, Default, PartialEq, morfi::form::FormModel)]
pub struct Profile {
    pub name: String,
    #[form(nested)]
    pub home: Address,
    #[form(nested)]
    pub work: Address,
}

fn main() {
    let fields = Profile::fields();
    let mut model = Profile::default();

    let work_city = fields.work().city();
    work_city.set(&mut model, "Bergen".to_string());

    assert_eq!(work_city.path().as_str(), "work.city");
    assert_eq!(fields.home().city().path().as_str(), "home.city");
    assert_eq!(model.work.city, "Bergen");
    assert!(model.home.city.is_empty());
    assert_eq!(fields.work().get(&model).city, "Bergen");
}
