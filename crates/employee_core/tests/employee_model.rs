use employee_core::{Employee, EmployeeValidationError};

#[test]
fn builder_leaves_identity_unset() {
    let employee = Employee::builder()
        .first_name("Peeku")
        .last_name("Neeku")
        .email("peeku.neeku@gmole .com")
        .build();

    assert_eq!(employee.id, None);
    assert!(employee.is_new());
    assert_eq!(employee, Employee::new("Peeku", "Neeku", "peeku.neeku@gmole .com"));
}

#[test]
fn builder_defaults_missing_fields_to_empty() {
    let employee = Employee::builder().email("only@example.com").build();
    assert_eq!(employee.first_name, "");
    assert_eq!(employee.last_name, "");
}

#[test]
fn try_build_rejects_non_positive_id() {
    let err = Employee::builder().id(0).try_build().unwrap_err();
    assert_eq!(err, EmployeeValidationError::NonPositiveId(0));

    let ok = Employee::builder().id(5).try_build().unwrap();
    assert_eq!(ok.id, Some(5));
}

#[test]
fn serialization_omits_unset_id() {
    let employee = Employee::new("Peeku", "Neeku", "peeku@example.com");
    let json = serde_json::to_value(&employee).unwrap();

    assert!(json.get("id").is_none());
    assert_eq!(json["first_name"], "Peeku");
    assert_eq!(json["last_name"], "Neeku");
    assert_eq!(json["email"], "peeku@example.com");

    let decoded: Employee = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, employee);
}
