mod mnist;
mod source;
