#[cfg(test)]
mod harness;

#[cfg(test)]
mod flow_tests;

#[cfg(test)]
mod retry_tests;
