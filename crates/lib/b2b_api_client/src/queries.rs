//! GraphQL documents sent to the backend.

use b2b_core::models::UserType;
use b2b_core::query::Entity;

pub const AUTHENTICATE_SALES_REP: &str = r#"
mutation AuthenticateSalesRep($email: String!, $password: String!) {
  authenticateSalesRep(email: $email, password: $password) {
    token
    salesRep {
      id
      email
      firstName
      lastName
      code
      phone
    }
  }
}
"#;

pub const AUTHENTICATE_ADMIN_USER: &str = r#"
mutation AuthenticateAdminUser($email: String!, $password: String!) {
  authenticateAdminUser(email: $email, password: $password) {
    token
    adminUser {
      id
      email
      firstName
      lastName
      username
    }
  }
}
"#;

const PAGINATION: &str = "
    pagination {
      totalItems
      totalItemOnPage
      totalPages
      currentPage
      pageSize
    }";

const CUSTOMER_SUMMARY: &str = "
      customer {
        id
        email
        firstName
        middleName
        lastName
        customerNumber
        customerGroupId
      }
      location {
        id
        name
        code
      }";

const PRODUCT: &str = "
        product {
          id
          sku
          name
          type
          indexPrice
          thumbnailImage
          variationInfo
        }";

/// Mutation name and the key holding the user record in each result element.
pub fn authentication(role: UserType) -> Option<(&'static str, &'static str, &'static str)> {
    match role {
        UserType::SalesRep => Some((
            AUTHENTICATE_SALES_REP,
            "authenticateSalesRep",
            "salesRep",
        )),
        UserType::Admin => Some((
            AUTHENTICATE_ADMIN_USER,
            "authenticateAdminUser",
            "adminUser",
        )),
        UserType::Customer => None,
    }
}

/// `get<Entity>` query document.
pub fn list_query(entity: Entity) -> String {
    match entity {
        Entity::Customers => format!(
            "query getCustomers(
  $pagination: Pagination
  $id: [Int]
  $firstName: String
  $lastName: String
  $email: String
  $customerNumber: String
  $sortOrder: SortOrderInput
) {{
  getCustomers(
    pagination: $pagination
    id: $id
    firstName: $firstName
    lastName: $lastName
    email: $email
    customerNumber: $customerNumber
    sortOrder: $sortOrder
  ) {{
    customers {{
      id
      firstName
      middleName
      lastName
      email
      createdAt
      updatedAt
      customerNumber
      netTerms
      companyName
      customerGroup {{
        id
        name
        taxClassId
      }}
      channels {{
        id
        name
        code
      }}
    }}{PAGINATION}
  }}
}}"
        ),
        Entity::Carts => format!(
            "query getCarts(
  $getCartsId: [Int]
  $customerId: [Int]
  $location: [String]
  $name: [String]
  $pagination: Pagination
  $sortOrder: SortOrderInput
) {{
  getCarts(
    id: $getCartsId
    customerId: $customerId
    location: $location
    name: $name
    pagination: $pagination
    sortOrder: $sortOrder
  ) {{
    carts {{
      id
      createdAt
      updatedAt
      name{CUSTOMER_SUMMARY}
      items {{
        id{PRODUCT}
        qty
        customPrice
        sidemark
      }}
    }}{PAGINATION}
  }}
}}"
        ),
        Entity::Quotes => format!(
            "query getQuotes(
  $id: [Int]
  $customerId: [Int]
  $salesRepId: [Int]
  $location: [String]
  $pagination: Pagination
  $sortOrder: SortOrderInput
) {{
  getQuotes(
    id: $id
    customerId: $customerId
    salesRepId: $salesRepId
    location: $location
    pagination: $pagination
    sortOrder: $sortOrder
  ) {{
    quotes {{
      id{CUSTOMER_SUMMARY}
      identifier
      shippingMethod
      shippingCost
      paymentMethod
      notes
      tax
      poNumber
      salesRepId
      items {{
        id{PRODUCT}
        qty
        customPrice
        sidemark
      }}
    }}{PAGINATION}
  }}
}}"
        ),
        Entity::Wishlists => format!(
            "query getWishlists(
  $id: [Int]
  $customerId: [Int]
  $pagination: Pagination
  $sortOrder: SortOrderInput
) {{
  getWishlists(
    id: $id
    customerId: $customerId
    pagination: $pagination
    sortOrder: $sortOrder
  ) {{
    wishlists {{
      id
      createdAt
      updatedAt
      name
      notes
      customer {{
        id
        email
        firstName
        middleName
        lastName
      }}
      location {{
        id
        name
        code
      }}
      items {{
        id
        wishlistId
        product {{
          id
          sku
          name
          thumbnailImage
          variationInfo
          indexPrice
        }}
        qty
        position
        notes
      }}
    }}{PAGINATION}
  }}
}}"
        ),
    }
}
