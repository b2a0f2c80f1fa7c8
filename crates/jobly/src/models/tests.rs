use super::{company, job};
use crate::filter::{CompanyFilter, JobFilter};
use crate::set_clause::FieldMap;
use crate::value::SqlValue;

#[test]
fn company_listing_without_filters_has_no_where() {
    let (sql, clause) = company::find_all_sql(&CompanyFilter::default()).unwrap();
    assert_eq!(
        sql,
        "SELECT handle, name, description, num_employees, logo_url FROM companies ORDER BY name"
    );
    assert!(clause.values.is_empty());
}

#[test]
fn company_listing_with_filters() {
    let filter = CompanyFilter {
        min_employees: Some(2),
        name: Some("C".into()),
        ..Default::default()
    };
    let (sql, clause) = company::find_all_sql(&filter).unwrap();
    assert!(sql.ends_with(
        "FROM companies WHERE num_employees >= $1 AND name ILIKE $2 ORDER BY name"
    ));
    assert_eq!(clause.params_ref().len(), 2);
}

#[test]
fn company_listing_rejects_inverted_range() {
    let filter = CompanyFilter {
        min_employees: Some(3),
        max_employees: Some(1),
        ..Default::default()
    };
    assert!(company::find_all_sql(&filter).unwrap_err().is_bad_request());
}

#[test]
fn company_update_aliases_and_binds_handle_last() {
    let fields = FieldMap::new()
        .with("numEmployees", 10)
        .with("logoUrl", SqlValue::Null);
    let (sql, set) = company::update_sql(&fields).unwrap();
    assert_eq!(
        sql,
        "UPDATE companies SET \"num_employees\"=$1, \"logo_url\"=$2 WHERE handle = $3 \
         RETURNING handle, name, description, num_employees, logo_url"
    );
    assert_eq!(set.values, vec![SqlValue::Int(10), SqlValue::Null]);
}

#[test]
fn company_update_rejects_handle_change() {
    let fields = FieldMap::new().with("handle", "new-handle");
    assert!(company::update_sql(&fields).unwrap_err().is_bad_request());
}

#[test]
fn company_update_rejects_empty() {
    let err = company::update_sql(&FieldMap::new()).unwrap_err();
    assert!(err.is_bad_request());
}

#[test]
fn job_listing_orders_by_title() {
    let filter = JobFilter {
        has_equity: Some(true),
        ..Default::default()
    };
    let (sql, clause) = job::find_all_sql(&filter).unwrap();
    assert_eq!(
        sql,
        "SELECT id, title, salary, equity, company_handle FROM jobs WHERE equity > 0 ORDER BY title"
    );
    assert!(clause.values.is_empty());
}

#[test]
fn job_update_aliases_company_handle() {
    let fields = FieldMap::new()
        .with("title", "Staff")
        .with("companyHandle", "c2");
    let (sql, set) = job::update_sql(&fields).unwrap();
    assert_eq!(
        sql,
        "UPDATE jobs SET \"title\"=$1, \"company_handle\"=$2 WHERE id = $3 \
         RETURNING id, title, salary, equity, company_handle"
    );
    assert_eq!(set.next_placeholder(), 3);
}

#[test]
fn job_update_rejects_id_change() {
    let fields = FieldMap::new().with("id", 9);
    assert!(job::update_sql(&fields).unwrap_err().is_bad_request());
}

#[test]
fn new_job_deserializes_equity_string() {
    let new: job::NewJob = serde_json::from_str(
        r#"{"title": "new", "companyHandle": "c1", "equity": "0.5", "salary": 100}"#,
    )
    .unwrap();
    assert_eq!(new.equity.unwrap().to_string(), "0.5");
    assert_eq!(new.company_handle, "c1");
}

#[test]
fn company_serializes_camel_case() {
    let company = company::Company {
        handle: "c1".into(),
        name: "C1".into(),
        description: "Desc1".into(),
        num_employees: Some(1),
        logo_url: None,
    };
    let value = serde_json::to_value(&company).unwrap();
    assert_eq!(value["numEmployees"], 1);
    assert!(value["logoUrl"].is_null());
}
