//! The aggregate function library invoked by `name()` path segments.
use serde_json::{Number, Value};

/// Reduces a non-empty-or-not numeric sequence to one number, if defined.
type Reducer = fn(&[f64]) -> Option<f64>;

/// Every function a `name()` segment may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Min,
    Max,
    Avg,
    StdDev,
    Sum,
    Length,
    Keys,
}

impl Function {
    /// Finds a function by its call name, without the parentheses.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "min" => Some(Function::Min),
            "max" => Some(Function::Max),
            "avg" => Some(Function::Avg),
            "stddev" => Some(Function::StdDev),
            "sum" => Some(Function::Sum),
            "length" => Some(Function::Length),
            "keys" => Some(Function::Keys),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Min => "min",
            Function::Max => "max",
            Function::Avg => "avg",
            Function::StdDev => "stddev",
            Function::Sum => "sum",
            Function::Length => "length",
            Function::Keys => "keys",
        }
    }

    fn reducer(self) -> Option<Reducer> {
        match self {
            Function::Min => Some(min),
            Function::Max => Some(max),
            Function::Avg => Some(avg),
            Function::StdDev => Some(stddev),
            Function::Sum => Some(sum),
            Function::Length | Function::Keys => None,
        }
    }

    /// Applies the function to one node, returning what it contributes to the next node set.
    ///
    /// Nodes of the wrong shape, and numeric reducers over arrays holding anything but
    /// numbers, contribute nothing.
    pub fn apply(self, node: &Value) -> Vec<Value> {
        match (self, node) {
            (Function::Keys, Value::Object(map)) => {
                map.keys().map(|k| Value::String(k.clone())).collect()
            }
            (Function::Length, Value::Array(items)) => vec![Value::from(items.len())],
            (_, Value::Array(items)) => self.reduce(items).into_iter().collect(),
            _ => Vec::new(),
        }
    }

    fn reduce(self, items: &[Value]) -> Option<Value> {
        let reducer = self.reducer()?;
        let numbers = items
            .iter()
            .map(|item| match item {
                Value::Number(n) => Some(n),
                _ => None,
            })
            .collect::<Option<Vec<&Number>>>()?;

        // Integer inputs keep integer results where the reduction allows it.
        if let Some(ints) = numbers.iter().map(|n| n.as_i64()).collect::<Option<Vec<i64>>>() {
            let exact = match self {
                Function::Min => ints.iter().min().copied(),
                Function::Max => ints.iter().max().copied(),
                Function::Sum => ints.iter().try_fold(0i64, |acc, &n| acc.checked_add(n)),
                _ => None,
            };
            if let Some(n) = exact {
                return Some(Value::from(n));
            }
        }

        let floats: Vec<f64> = numbers.iter().filter_map(|n| n.as_f64()).collect();
        reducer(&floats).and_then(Number::from_f64).map(Value::Number)
    }
}

fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

fn sum(values: &[f64]) -> Option<f64> {
    Some(values.iter().sum())
}

fn avg(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    sum(values).map(|total| total / values.len() as f64)
}

/// Sample standard deviation; undefined below two values.
fn stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = avg(values)?;
    let squares: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    Some((squares / (values.len() - 1) as f64).sqrt())
}
