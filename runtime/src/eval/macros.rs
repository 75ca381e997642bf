macro_rules! pop_h256 {
	( $interp:expr, $( $x:ident ),* ) => (
		$(
			let $x = $interp.stack.pop_h256()?;
		)*
	);
}

macro_rules! pop_u256 {
	( $interp:expr, $( $x:ident ),* ) => (
		$(
			let $x = $interp.stack.pop()?;
		)*
	);
}

macro_rules! push_h256 {
	( $interp:expr, $( $x:expr ),* ) => (
		$(
			$interp.stack.push(U256::from_big_endian(&$x[..]))?;
		)*
	)
}

macro_rules! push_u256 {
	( $interp:expr, $( $x:expr ),* ) => (
		$(
			$interp.stack.push($x)?;
		)*
	)
}

macro_rules! op1_u256_fn {
	( $interp:expr, $op:path ) => {{
		pop_u256!($interp, op1);
		let ret = $op(op1);
		push_u256!($interp, ret);

		Ok(Control::Continue(1))
	}};
}

macro_rules! op2_u256_bool_ref {
	( $interp:expr, $op:ident ) => {{
		pop_u256!($interp, op1, op2);
		let ret = op1.$op(&op2);
		push_u256!($interp, if ret { U256::one() } else { U256::zero() });

		Ok(Control::Continue(1))
	}};
}

macro_rules! op2_u256 {
	( $interp:expr, $op:ident ) => {{
		pop_u256!($interp, op1, op2);
		let ret = op1.$op(op2);
		push_u256!($interp, ret);

		Ok(Control::Continue(1))
	}};
}

macro_rules! op2_u256_tuple {
	( $interp:expr, $op:ident ) => {{
		pop_u256!($interp, op1, op2);
		let (ret, ..) = op1.$op(op2);
		push_u256!($interp, ret);

		Ok(Control::Continue(1))
	}};
}

macro_rules! op2_u256_fn {
	( $interp:expr, $op:path ) => {{
		pop_u256!($interp, op1, op2);
		let ret = $op(op1, op2);
		push_u256!($interp, ret);

		Ok(Control::Continue(1))
	}};
}

macro_rules! op3_u256_fn {
	( $interp:expr, $op:path ) => {{
		pop_u256!($interp, op1, op2, op3);
		let ret = $op(op1, op2, op3);
		push_u256!($interp, ret);

		Ok(Control::Continue(1))
	}};
}

macro_rules! as_usize_or_fail {
	( $v:expr ) => {{
		if $v > U256::from(usize::MAX) {
			return Err(ExitException::OutOfGas.into());
		}

		$v.as_usize()
	}};

	( $v:expr, $reason:expr ) => {{
		if $v > U256::from(usize::MAX) {
			return Err($reason.into());
		}

		$v.as_usize()
	}};
}
