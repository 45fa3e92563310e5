//! A small example service, shared by the binaries and the integration tests.
//!
//! | operation          | method | template          | input            | output        |
//! |--------------------|--------|-------------------|------------------|---------------|
//! | `foo`              | POST   | `/foo/:age`       | `{name, age}`    | `{message}`   |
//! | `primitive_number` | GET    | `/number/:n`      | number           | string        |
//! | `max`              | POST   | `/max/:num/:num`  | array of numbers | number        |
//! | `bar`              | GET    | `/bar`            | nothing          | string        |

use serde::{Deserialize, Serialize};

use crate::contract::guard::{self, PrimitiveType};
use crate::contract::HttpMethod;
use crate::envelope::RequestEnvelope;
use crate::routing::RegistryError;
use crate::service::{Endpoint, HandlerError, Implementation, Service};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FooRequest {
    pub name: String,
    pub age: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FooResult {
    pub message: String,
}

/// The demo service definition with one typed handle per operation.
#[derive(Debug, Clone)]
pub struct DemoService {
    pub service: Service,
    pub foo: Endpoint<FooRequest, FooResult>,
    pub primitive_number: Endpoint<f64, String>,
    pub max: Endpoint<Vec<f64>, f64>,
    pub bar: Endpoint<(), String>,
}

impl DemoService {
    pub fn define() -> Result<Self, RegistryError> {
        let mut builder = Service::builder();

        let foo = builder.register(
            HttpMethod::Post,
            "/foo/:age",
            Some(guard::props(&[
                ("name", PrimitiveType::String),
                ("age", PrimitiveType::Number),
            ])),
            guard::props(&[("message", PrimitiveType::String)]),
            "foo",
        )?;
        let primitive_number = builder.register(
            HttpMethod::Get,
            "/number/:n",
            Some(guard::number()),
            guard::string(),
            "primitive_number",
        )?;
        let max = builder.register(
            HttpMethod::Post,
            "/max/:num/:num",
            Some(guard::array_of(guard::number())),
            guard::number(),
            "max",
        )?;
        let bar = builder.register(HttpMethod::Get, "/bar", None, guard::string(), "bar")?;

        Ok(Self {
            service: builder.build(),
            foo,
            primitive_number,
            max,
            bar,
        })
    }

    /// The server-side logic of every operation.
    pub fn implementation(&self) -> Implementation {
        Implementation::new()
            .bind(&self.foo, |req: RequestEnvelope<FooRequest>| async move {
                let FooRequest { name, age } = req.payload;
                Ok::<_, HandlerError>(FooResult {
                    message: format!("Hello, {name}! You are {age} years old"),
                })
            })
            .bind(&self.primitive_number, |req: RequestEnvelope<f64>| async move {
                Ok::<_, HandlerError>(format!("You sent {}", req.payload))
            })
            .bind(&self.max, |req: RequestEnvelope<Vec<f64>>| async move {
                req.payload
                    .into_iter()
                    .reduce(f64::max)
                    .ok_or_else(|| HandlerError::from("max of an empty list"))
            })
            .bind(&self.bar, |_req: RequestEnvelope<()>| async move {
                Ok::<_, HandlerError>("bar".to_string())
            })
    }
}
